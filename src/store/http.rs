//! HTTP implementation of the store boundary against the collection backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::models::{RawAcquisition, SearchResult};

use super::{LabelFilter, LabelPage, LabelSource, ResultsSink, StoreError};

/// Client for the backend's labels and searches routes.
#[derive(Clone)]
pub struct HttpStore {
    client: Client,
    base: String,
}

#[derive(Deserialize)]
struct UpsertResponse {
    ok: usize,
}

impl HttpStore {
    /// Create a store client from the resolved configuration.
    pub fn new(config: &Config) -> Self {
        let mut builder = Client::builder().gzip(true);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().expect("failed to create HTTP client");

        Self {
            client,
            base: config.api_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl LabelSource for HttpStore {
    async fn fetch_labels(
        &self,
        filter: &LabelFilter,
        skip: usize,
        limit: usize,
    ) -> Result<LabelPage, StoreError> {
        let mut request = self
            .client
            .get(format!("{}/labels", self.base))
            .query(&[("skip", skip.to_string()), ("amount", limit.to_string())]);

        if let Some(id) = &filter.metadata_id {
            request = request.query(&[("id", id.as_str())]);
        } else {
            if let Some(since) = &filter.since {
                request = request.query(&[("since", since.to_rfc3339())]);
            }
            if let Some(ids) = &filter.metadata_ids {
                for id in ids {
                    request = request.query(&[("metadataId", id.as_str())]);
                }
            }
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status()));
        }
        let content: Vec<RawAcquisition> = response.json().await?;

        let overflow = content.len() == limit;
        Ok(LabelPage { content, overflow })
    }
}

#[async_trait]
impl ResultsSink for HttpStore {
    async fn upsert_results(&self, records: &[SearchResult]) -> Result<usize, StoreError> {
        let response = self
            .client
            .post(format!("{}/searches", self.base))
            .json(records)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status()));
        }
        let body: UpsertResponse = response.json().await?;

        Ok(body.ok)
    }
}
