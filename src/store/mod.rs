//! Store boundary: the label source and the results sink.
//!
//! Both stores belong to the collection backend; the pipeline only needs
//! a paginated, time-filtered read of raw acquisitions and an idempotent
//! bulk upsert of derived search results.

mod http;
#[cfg(test)]
mod memory;

pub use http::HttpStore;
#[cfg(test)]
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{RawAcquisition, SearchResult};

/// Errors crossing the store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("store returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Query narrowing one labels fetch.
#[derive(Debug, Clone, Default)]
pub struct LabelFilter {
    /// Only records saved strictly after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Allowlist of metadata ids.
    pub metadata_ids: Option<Vec<String>>,
    /// Single target; overrides the time filter entirely.
    pub metadata_id: Option<String>,
}

/// One fetched page of raw acquisitions, ordered by save time.
#[derive(Debug, Clone)]
pub struct LabelPage {
    pub content: Vec<RawAcquisition>,
    /// True when the page was full: more backlog is likely pending.
    pub overflow: bool,
}

/// Paginated read of raw acquisition records.
#[async_trait]
pub trait LabelSource: Send + Sync {
    async fn fetch_labels(
        &self,
        filter: &LabelFilter,
        skip: usize,
        limit: usize,
    ) -> Result<LabelPage, StoreError>;
}

/// Bulk upsert of derived search results, idempotent on their id.
#[async_trait]
pub trait ResultsSink: Send + Sync {
    async fn upsert_results(&self, records: &[SearchResult]) -> Result<usize, StoreError>;
}
