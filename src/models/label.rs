//! Raw acquisition records as stored by the collection backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One serialized DOM sub-element captured during page acquisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFragment {
    /// Monotonic position of the fragment within the page snapshot.
    pub order: i64,
    /// Outer HTML of the captured element.
    pub html: String,
}

/// One captured search-results page snapshot with its DOM fragments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAcquisition {
    pub id: String,
    /// Identifier of the search-query evidence this snapshot belongs to.
    pub metadata_id: String,
    pub public_key: String,
    /// Full URL of the page the fragments were captured from.
    pub href: String,
    pub saving_time: DateTime<Utc>,
    /// Ordered fragment sequence. Fragments without a recognizable
    /// aria-label carry no classification and are dropped downstream.
    pub acquired: Vec<RawFragment>,
}
