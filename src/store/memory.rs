//! In-memory store used by scheduler and pipeline tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::models::{RawAcquisition, SearchResult};

use super::{LabelFilter, LabelPage, LabelSource, ResultsSink, StoreError};

#[derive(Default)]
struct Inner {
    labels: Mutex<Vec<RawAcquisition>>,
    results: Mutex<HashMap<String, SearchResult>>,
}

/// Label source and results sink over in-process collections. Clones share
/// state; upserts are keyed on the result id, mirroring the backend's
/// idempotence contract.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_label(&self, record: RawAcquisition) {
        self.inner.labels.lock().unwrap().push(record);
    }

    pub fn results(&self) -> Vec<SearchResult> {
        self.inner.results.lock().unwrap().values().cloned().collect()
    }

    pub fn result_count(&self) -> usize {
        self.inner.results.lock().unwrap().len()
    }
}

#[async_trait]
impl LabelSource for MemoryStore {
    async fn fetch_labels(
        &self,
        filter: &LabelFilter,
        skip: usize,
        limit: usize,
    ) -> Result<LabelPage, StoreError> {
        let labels = self.inner.labels.lock().unwrap();

        let mut matched: Vec<RawAcquisition> = labels
            .iter()
            .filter(|r| {
                if let Some(id) = &filter.metadata_id {
                    return r.metadata_id == *id;
                }
                if let Some(since) = &filter.since {
                    if r.saving_time <= *since {
                        return false;
                    }
                }
                if let Some(ids) = &filter.metadata_ids {
                    if !ids.contains(&r.metadata_id) {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        matched.sort_by_key(|r| r.saving_time);

        let content: Vec<RawAcquisition> = matched.into_iter().skip(skip).take(limit).collect();
        let overflow = content.len() == limit;
        Ok(LabelPage { content, overflow })
    }
}

#[async_trait]
impl ResultsSink for MemoryStore {
    async fn upsert_results(&self, records: &[SearchResult]) -> Result<usize, StoreError> {
        let mut results = self.inner.results.lock().unwrap();
        for record in records {
            results.insert(record.id.clone(), record.clone());
        }
        Ok(records.len())
    }
}
