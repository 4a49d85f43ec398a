//! DOM fragment classifier.
//!
//! Each captured fragment is parsed in isolation; the first element
//! carrying an `aria-label` decides the fragment's nature. Fragments
//! matching none of the known shapes are dropped without error.

use scraper::{Html, Selector};

use crate::models::RawFragment;

/// Classification tag of a parsed fragment, carrying the fields that
/// only exist for that nature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nature {
    Video { title: String, href: String },
    Duration { display_length: String },
    Author { href: String },
}

/// Nature without its payload, for positional lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NatureKind {
    Video,
    Duration,
    Author,
}

impl Nature {
    pub fn kind(&self) -> NatureKind {
        match self {
            Nature::Video { .. } => NatureKind::Video,
            Nature::Duration { .. } => NatureKind::Duration,
            Nature::Author { .. } => NatureKind::Author,
        }
    }
}

/// A fragment that classified successfully.
#[derive(Debug, Clone)]
pub struct ClassifiedNode {
    /// Position within the page snapshot; unique per record, not globally.
    pub order: i64,
    /// The element's full aria-label text.
    pub ariala: String,
    pub nature: Nature,
}

/// Classify one fragment, or None when no known shape matches.
///
/// Never mutates the source record; the fragment HTML is parsed into a
/// throwaway document.
pub fn classify_fragment(fragment: &RawFragment) -> Option<ClassifiedNode> {
    let doc = Html::parse_fragment(&fragment.html);
    let selector = Selector::parse("[aria-label]").unwrap();

    let element = doc.select(&selector).next()?;
    let el = element.value();
    let ariala = el.attr("aria-label")?.to_string();

    let nature = match el.name() {
        "a" if el.attr("id") == Some("video-title") => Nature::Video {
            title: el.attr("title").unwrap_or_default().to_string(),
            href: el.attr("href").unwrap_or_default().to_string(),
        },
        "span" => Nature::Duration {
            display_length: element.text().collect::<String>().trim().to_string(),
        },
        "a" if el
            .attr("href")
            .map_or(false, |h| h.starts_with("/channel/")) =>
        {
            Nature::Author {
                href: el.attr("href").unwrap_or_default().to_string(),
            }
        }
        _ => return None,
    };

    Some(ClassifiedNode {
        order: fragment.order,
        ariala,
        nature,
    })
}
