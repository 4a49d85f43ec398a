//! Label dissection: splitting a composite accessibility label into the
//! author name and the mined relative-time / view-count substructure.

use regex::Regex;
use tracing::debug;

use super::locale::{spec_for, LocaleInfo};
use super::longlabel::{self, Mined};

/// Outcome of one dissection. `mined` stays None when the secondary miner
/// could not explain the label; the record degrades to incomplete instead
/// of failing.
#[derive(Debug, Clone)]
pub struct Dissection {
    pub author_name: String,
    pub mined: Option<Mined>,
}

/// Hack apart a composite label and locate the author name.
///
/// A label looks like:
/// "Introducing Blackview BV9900 Pro, the World's Fastest Thermal Rugged
///  Phone by Blackview 2 months ago 1 minute, 44 seconds 239,340 views"
///
/// With a separator ("by") the author segment is everything after its last
/// occurrence; without one the label is assumed to be prefixed by exactly
/// the title plus one space. The duration clause and the trailing
/// relative-time text are then stripped off.
pub fn dissect_label(
    label: &str,
    title: &str,
    duration_label: &str,
    ux: &LocaleInfo,
) -> Dissection {
    let first = if !ux.separator.is_empty() {
        let sep = format!(" {} ", ux.separator);
        label
            .rsplit(sep.as_str())
            .next()
            .unwrap_or(label)
            .to_string()
    } else {
        let skip = title.chars().count() + 1;
        label.chars().skip(skip).collect()
    };

    // "Blackview 2 months ago 1 minute, 44 seconds 239,340 views"
    let duration_re = Regex::new(&format!("{}.*", regex::escape(duration_label)))
        .expect("escaped literal always compiles");
    let second = duration_re.replace(&first, "").into_owned();

    // "Blackview 2 months ago " -> "Blackview"
    let trailing_re = Regex::new(r"\s\d{1,2}\s\w+\s?.*").unwrap();
    let author_name = trailing_re.replace(&second, "").into_owned();

    let mined = spec_for(&ux.locale).and_then(|spec| longlabel::parse(label, &author_name, spec));
    if mined.is_none() {
        debug!(label, author = %author_name, "label resisted mining");
    }

    Dissection { author_name, mined }
}
