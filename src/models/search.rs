//! Derived search-result records written to the results store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One video entry reconstructed from a captured search-results page.
///
/// `id` is a pure function of the identifying fields, so re-running the
/// parser over the same input upserts the same records instead of
/// duplicating them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub metadata_id: String,
    pub public_key: String,
    /// Locale guessed from the page's accessibility labels.
    pub clang: String,
    pub saving_time: DateTime<Utc>,
    pub video_id: String,
    pub title: String,
    /// Position of the video within the search page, zero-based.
    pub priority_order: usize,
    pub search_terms: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_views: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_channel: Option<String>,
    /// Set when any of the four enrichment fields could not be derived.
    /// A quality flag, not an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incomplete: Option<bool>,
}

impl SearchResult {
    /// Deterministic id over the identifying fields (idempotent upsert key).
    pub fn compute_id(
        metadata_id: &str,
        search_terms: &str,
        public_key: &str,
        priority_order: usize,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(metadata_id.as_bytes());
        hasher.update([0x1f]);
        hasher.update(search_terms.as_bytes());
        hasher.update([0x1f]);
        hasher.update(public_key.as_bytes());
        hasher.update([0x1f]);
        hasher.update(priority_order.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_id_is_deterministic() {
        let a = SearchResult::compute_id("meta1", "foo bar", "pubkey", 0);
        let b = SearchResult::compute_id("meta1", "foo bar", "pubkey", 0);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_compute_id_varies_per_field() {
        let base = SearchResult::compute_id("meta1", "foo", "pubkey", 0);
        assert_ne!(base, SearchResult::compute_id("meta2", "foo", "pubkey", 0));
        assert_ne!(base, SearchResult::compute_id("meta1", "bar", "pubkey", 0));
        assert_ne!(base, SearchResult::compute_id("meta1", "foo", "other", 0));
        assert_ne!(base, SearchResult::compute_id("meta1", "foo", "pubkey", 1));
    }

    #[test]
    fn test_field_boundaries_do_not_collide() {
        // moving a character across the field boundary must change the id
        let a = SearchResult::compute_id("ab", "c", "k", 0);
        let b = SearchResult::compute_id("a", "bc", "k", 0);
        assert_ne!(a, b);
    }
}
