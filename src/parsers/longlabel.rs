//! Secondary label miner: relative time and view count extraction.
//!
//! Works on the composite accessibility label with per-locale vocabulary
//! tables. A label the tables cannot explain yields None; the caller
//! degrades the record instead of aborting the batch.

use regex::Regex;

use super::locale::LocaleSpec;

/// Substructure mined from a composite label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mined {
    /// Age of the video expressed in seconds.
    pub relative_seconds: u64,
    /// Absolute view count.
    pub views: u64,
}

/// Mine relative time and views out of a composite accessibility label.
///
/// `author_name` anchors the scan to the text after the author, keeping
/// digits inside the title from being read as a view count.
pub fn parse(label: &str, author_name: &str, spec: &LocaleSpec) -> Option<Mined> {
    let tail = if author_name.is_empty() {
        label
    } else {
        label
            .rfind(author_name)
            .map(|i| &label[i + author_name.len()..])
            .unwrap_or(label)
    };

    let relative_seconds = mine_relative_time(tail, spec)?;
    let views = mine_views(tail, spec)?;
    Some(Mined {
        relative_seconds,
        views,
    })
}

fn unit_seconds(spec: &LocaleSpec, word: &str) -> Option<u64> {
    spec.time_units
        .iter()
        .find(|(stem, _)| word.starts_with(stem))
        .map(|(_, secs)| *secs)
}

/// Locate the "ago" marker and convert the adjacent number/unit pairs to
/// seconds. Suffix-marker languages ("2 months ago") carry the pairs
/// before the marker; prefix-marker languages ("il y a 2 mois") after it,
/// where only the first pair belongs to the age clause and the rest is
/// the duration.
fn mine_relative_time(tail: &str, spec: &LocaleSpec) -> Option<u64> {
    let padded = format!(" {} ", tail.to_lowercase());

    let (pos, len) = spec
        .ago_words
        .iter()
        .filter_map(|w| {
            // CJK markers attach directly to the unit word, no spacing
            if w.chars().all(|c| c.is_ascii()) {
                let needle = format!(" {} ", w);
                padded.find(&needle).map(|i| (i, needle.len()))
            } else {
                padded.find(*w).map(|i| (i, w.len()))
            }
        })
        .min()?;

    let pair_re = Regex::new(r"(\d+)\s*(\p{L}+)").unwrap();

    let before = &padded[..pos];
    let mut total: u64 = 0;
    for cap in pair_re.captures_iter(before) {
        if let Some(secs) = unit_seconds(spec, &cap[2]) {
            let n: u64 = cap[1].parse().ok()?;
            total += n * secs;
        }
    }
    if total > 0 {
        return Some(total);
    }

    let after = &padded[pos + len..];
    for cap in pair_re.captures_iter(after) {
        if let Some(secs) = unit_seconds(spec, &cap[2]) {
            let n: u64 = cap[1].parse().ok()?;
            return Some(n * secs);
        }
    }
    None
}

/// Extract the view count: the last grouped number followed by one of the
/// locale's views words. Grouping separators vary per locale (comma, dot,
/// narrow spaces) and are simply stripped.
fn mine_views(tail: &str, spec: &LocaleSpec) -> Option<u64> {
    let words = spec
        .views_words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(
        "(?i)([0-9][0-9.,\\s\u{00a0}\u{202f}]*)(?:{})",
        words
    );
    let re = Regex::new(&pattern).ok()?;

    let caps = re.captures_iter(tail).last()?;
    let digits: String = caps[1].chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::locale::spec_for;

    #[test]
    fn test_mine_english_label() {
        let spec = spec_for("en").unwrap();
        let label = "Introducing Blackview BV9900 Pro, the World's Fastest Thermal \
                     Rugged Phone by Blackview 2 months ago 1 minute, 44 seconds 239,340 views";
        let mined = parse(label, "Blackview", spec).unwrap();
        assert_eq!(mined.relative_seconds, 2 * 2_592_000);
        assert_eq!(mined.views, 239_340);
    }

    #[test]
    fn test_author_anchor_skips_title_digits() {
        let spec = spec_for("en").unwrap();
        let label = "Top 10 phones of 2019 by Tech Brothers 6 months ago \
                     3 minutes, 46 seconds 20,002 views";
        let mined = parse(label, "Tech Brothers", spec).unwrap();
        assert_eq!(mined.relative_seconds, 6 * 2_592_000);
        assert_eq!(mined.views, 20_002);
    }

    #[test]
    fn test_mine_french_prefix_marker() {
        let spec = spec_for("fr").unwrap();
        let label = "Un téléphone incassable de Blackview il y a 2 mois \
                     1 minute et 44 secondes 239 340 vues";
        let mined = parse(label, "Blackview", spec).unwrap();
        assert_eq!(mined.relative_seconds, 2 * 2_592_000);
        assert_eq!(mined.views, 239_340);
    }

    #[test]
    fn test_mine_italian_label() {
        let spec = spec_for("it").unwrap();
        let label = "Un video qualunque di Creatore 3 settimane fa \
                     2 minuti e 10 secondi 1.234 visualizzazioni";
        let mined = parse(label, "Creatore", spec).unwrap();
        assert_eq!(mined.relative_seconds, 3 * 604_800);
        assert_eq!(mined.views, 1_234);
    }

    #[test]
    fn test_compound_age_sums_units() {
        let spec = spec_for("en").unwrap();
        let label = "Video by Someone 1 year 2 months ago 3 minutes 10 views";
        let mined = parse(label, "Someone", spec).unwrap();
        assert_eq!(mined.relative_seconds, 31_536_000 + 2 * 2_592_000);
    }

    #[test]
    fn test_label_without_ago_marker_fails() {
        let spec = spec_for("en").unwrap();
        assert!(parse("Live now by Someone 120 watching", "Someone", spec).is_none());
    }

    #[test]
    fn test_label_without_views_fails() {
        let spec = spec_for("en").unwrap();
        assert!(parse("Video by Someone 2 months ago", "Someone", spec).is_none());
    }

    #[test]
    fn test_missing_author_scans_whole_label() {
        let spec = spec_for("en").unwrap();
        let label = "Video by Someone 2 months ago 1 minute 5,000 views";
        let mined = parse(label, "Nonexistent Author", spec).unwrap();
        assert_eq!(mined.views, 5_000);
    }
}
