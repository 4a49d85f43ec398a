//! Polling loop: adaptive frequency, look-back window, overflow handling.
//!
//! One logical loop processes one batch at a time to completion before
//! sleeping, so `last_execution` advances monotonically without races.
//! Bad input data never stops the loop; only misconfiguration or the
//! configured ceiling does.

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::models::SearchResult;
use crate::pipeline::assembler::process_acquisition;
use crate::store::{LabelFilter, LabelSource, ResultsSink};

/// Poll interval when the source is idle, seconds.
const IDLE_FREQUENCY: f64 = 5.0;
/// Poll interval while draining backlog, seconds.
const DRAIN_FREQUENCY: f64 = 0.1;
/// Default page size for each labels fetch.
pub const AMOUNT_DEFAULT: usize = 80;
/// Default initial look-back, minutes.
pub const BACK_IN_TIME_DEFAULT: i64 = 1;

/// Scheduler knobs resolved from the CLI at startup.
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    pub skip: usize,
    pub amount: usize,
    /// Processed-count ceiling; reaching it terminates the process with
    /// the ceiling as exit code.
    pub stop: Option<usize>,
    pub minutes_ago: i64,
    /// Single target metadata id; implies one cycle then normal exit.
    pub target_id: Option<String>,
    /// Allowlist of metadata ids.
    pub allowed_ids: Option<Vec<String>>,
}

/// Per-cycle statistics, logged at the start of each non-empty cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleStats {
    pub lastamount: Option<usize>,
    pub currentamount: Option<usize>,
    pub last: Option<DateTime<Utc>>,
    pub current: Option<DateTime<Utc>>,
}

/// Mutable loop state, threaded through each cycle. Never persisted;
/// a restart re-applies the look-back window.
#[derive(Debug, Clone)]
pub struct PollState {
    /// Lower bound of the sliding time filter.
    pub last_execution: DateTime<Utc>,
    pub processed_counter: usize,
    /// Seconds until the next fetch.
    pub computed_frequency: f64,
    pub nodata_counter: usize,
    /// Running count of results flagged incomplete, reported when grown.
    pub incomplete_seen: usize,
    last_reported_incomplete: usize,
    pub stats: CycleStats,
}

impl PollState {
    pub fn new(minutes_ago: i64) -> Self {
        Self {
            last_execution: Utc::now() - chrono::Duration::minutes(minutes_ago),
            processed_counter: 0,
            computed_frequency: IDLE_FREQUENCY,
            nodata_counter: 0,
            incomplete_seen: 0,
            last_reported_incomplete: 0,
            stats: CycleStats::default(),
        }
    }
}

/// Drives the fetch → classify → reconstruct → dissect → assemble → sink
/// pipeline against a label source and a results sink.
pub struct Scheduler<S, K> {
    source: S,
    sink: K,
    opts: SchedulerOptions,
}

impl<S: LabelSource, K: ResultsSink> Scheduler<S, K> {
    pub fn new(source: S, sink: K, opts: SchedulerOptions) -> Self {
        Self { source, sink, opts }
    }

    fn build_filter(&self, state: &PollState) -> LabelFilter {
        if let Some(id) = &self.opts.target_id {
            debug!(id, "targeting a specific metadata id");
            return LabelFilter {
                since: None,
                metadata_ids: None,
                metadata_id: Some(id.clone()),
            };
        }
        LabelFilter {
            since: Some(state.last_execution),
            metadata_ids: self.opts.allowed_ids.clone(),
            metadata_id: None,
        }
    }

    /// One fetch/process/upsert cycle against the stores.
    pub async fn cycle(&self, state: &mut PollState) -> Result<()> {
        let filter = self.build_filter(state);
        let page = self
            .source
            .fetch_labels(&filter, self.opts.skip, self.opts.amount)
            .await?;

        if page.content.is_empty() {
            state.nodata_counter += 1;
            if state.nodata_counter % 10 == 1 {
                debug!(
                    cycles = state.nodata_counter,
                    since = ?filter.since,
                    "no data at the last query"
                );
            }
            state.last_execution = Utc::now() - chrono::Duration::minutes(2);
            state.computed_frequency = IDLE_FREQUENCY;
            return Ok(());
        }
        state.computed_frequency = DRAIN_FREQUENCY;

        if !page.overflow {
            // caught up: come back to check a conservative minute before now
            state.last_execution = Utc::now() - chrono::Duration::minutes(BACK_IN_TIME_DEFAULT);
            debug!(documents = page.content.len(), "page not full, caught up");
        } else if let (Some(first), Some(last)) = (page.content.first(), page.content.last()) {
            // continue draining forward from the last seen save time
            state.last_execution = last.saving_time;
            info!(
                first = %first.saving_time,
                count = page.content.len(),
                span_minutes = (last.saving_time - first.saving_time).num_minutes(),
                next_filter = %state.last_execution,
                "page full, backlog pending"
            );
        }

        if state.stats.currentamount.is_some() || state.stats.lastamount.is_some() {
            debug!(
                processed = state.processed_counter,
                previous_amount = ?state.stats.currentamount,
                previous_cycle = ?state.stats.last,
                batch = page.content.len(),
                "starting a new cycle"
            );
        }
        state.stats.last = state.stats.current;
        state.stats.current = Some(Utc::now());
        state.stats.lastamount = state.stats.currentamount;
        state.stats.currentamount = Some(page.content.len());

        state.processed_counter += page.content.len();

        let results: Vec<SearchResult> = page
            .content
            .iter()
            .flat_map(process_acquisition)
            .collect();

        let incomplete = results
            .iter()
            .filter(|r| r.incomplete == Some(true))
            .count();
        state.incomplete_seen += incomplete;
        if state.incomplete_seen > state.last_reported_incomplete {
            debug!(
                total = state.incomplete_seen,
                "labels resisting full dissection so far"
            );
            state.last_reported_incomplete = state.incomplete_seen;
        }

        debug!(
            records = page.content.len(),
            results = results.len(),
            "processed batch"
        );

        if !results.is_empty() {
            let started = Utc::now();
            let ok = self.sink.upsert_results(&results).await?;
            info!(
                processed = state.processed_counter,
                upserted = ok,
                took_secs = (Utc::now() - started).num_seconds(),
                "cycle completed"
            );
        }

        Ok(())
    }

    /// Drive cycles until single-use completion or the ceiling. Returns
    /// the process exit code.
    pub async fn run(&self) -> Result<i32> {
        let mut state = PollState::new(self.opts.minutes_ago);
        if self.opts.minutes_ago != BACK_IN_TIME_DEFAULT {
            info!(
                minutes = self.opts.minutes_ago,
                since = %state.last_execution,
                "look-back window overridden"
            );
        }

        loop {
            if let Some(stop) = self.opts.stop {
                if state.processed_counter >= stop {
                    info!(
                        stop,
                        processed = state.processed_counter,
                        "reached configured processing limit"
                    );
                    return Ok(stop as i32);
                }
            }

            if let Err(err) = self.cycle(&mut state).await {
                error!(error = ?err, "cycle failed, retrying after the idle interval");
                state.computed_frequency = IDLE_FREQUENCY;
            }

            if self.opts.target_id.is_some() {
                debug!("single execution done");
                return Ok(0);
            }

            tokio::time::sleep(Duration::from_secs_f64(state.computed_frequency)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawAcquisition, RawFragment};
    use crate::store::{LabelPage, MemoryStore, StoreError};
    use async_trait::async_trait;

    fn options() -> SchedulerOptions {
        SchedulerOptions {
            skip: 0,
            amount: AMOUNT_DEFAULT,
            stop: None,
            minutes_ago: BACK_IN_TIME_DEFAULT,
            target_id: None,
            allowed_ids: None,
        }
    }

    fn acquisition(metadata_id: &str, saving_time: DateTime<Utc>) -> RawAcquisition {
        RawAcquisition {
            id: format!("label-{}", metadata_id),
            metadata_id: metadata_id.to_string(),
            public_key: "pubkey".to_string(),
            href: "https://www.youtube.com/results?search_query=foo".to_string(),
            saving_time,
            acquired: vec![RawFragment {
                order: 11,
                html: r#"<a id="video-title" title="Foo Video" href="/watch?v=abc123"
                    aria-label="Foo Video by Some Author 2 months ago 3 minutes, 46 seconds 20,002 views">x</a>"#
                    .to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_empty_fetch_backs_off() {
        let store = MemoryStore::new();
        let scheduler = Scheduler::new(store.clone(), store.clone(), options());
        let mut state = PollState::new(BACK_IN_TIME_DEFAULT);

        scheduler.cycle(&mut state).await.unwrap();

        assert_eq!(state.computed_frequency, IDLE_FREQUENCY);
        assert_eq!(state.nodata_counter, 1);
        let lookback = Utc::now() - state.last_execution;
        assert!(lookback >= chrono::Duration::seconds(119));
        assert!(lookback <= chrono::Duration::seconds(121));
    }

    #[tokio::test]
    async fn test_partial_page_resets_lookback_to_one_minute() {
        let store = MemoryStore::new();
        store.push_label(acquisition("meta1", Utc::now() - chrono::Duration::seconds(30)));
        let scheduler = Scheduler::new(store.clone(), store.clone(), options());
        let mut state = PollState::new(BACK_IN_TIME_DEFAULT);

        scheduler.cycle(&mut state).await.unwrap();

        assert_eq!(state.computed_frequency, DRAIN_FREQUENCY);
        assert_eq!(state.processed_counter, 1);
        let lookback = Utc::now() - state.last_execution;
        assert!(lookback >= chrono::Duration::seconds(59));
        assert!(lookback <= chrono::Duration::seconds(61));
        assert_eq!(store.result_count(), 1);
    }

    #[tokio::test]
    async fn test_full_page_advances_to_last_saving_time() {
        let store = MemoryStore::new();
        let t0 = Utc::now() - chrono::Duration::seconds(40);
        let t1 = Utc::now() - chrono::Duration::seconds(20);
        store.push_label(acquisition("meta1", t0));
        store.push_label(acquisition("meta2", t1));

        let mut opts = options();
        opts.amount = 2; // page cap equals batch size: overflow
        let scheduler = Scheduler::new(store.clone(), store.clone(), opts);
        let mut state = PollState::new(BACK_IN_TIME_DEFAULT);

        scheduler.cycle(&mut state).await.unwrap();

        assert_eq!(state.last_execution, t1);
        assert_eq!(state.processed_counter, 2);
    }

    #[tokio::test]
    async fn test_upserts_are_idempotent_across_cycles() {
        let store = MemoryStore::new();
        store.push_label(acquisition("meta1", Utc::now() - chrono::Duration::seconds(30)));
        let scheduler = Scheduler::new(store.clone(), store.clone(), options());

        let mut state = PollState::new(BACK_IN_TIME_DEFAULT);
        scheduler.cycle(&mut state).await.unwrap();
        // second cycle re-reads the same record (lookback reset to 1 minute)
        scheduler.cycle(&mut state).await.unwrap();

        assert_eq!(store.result_count(), 1);
        assert_eq!(state.processed_counter, 2);
    }

    #[tokio::test]
    async fn test_target_id_runs_single_cycle() {
        let store = MemoryStore::new();
        // old enough to fall outside any time window: the targeted filter
        // must reach it anyway
        store.push_label(acquisition("meta1", Utc::now() - chrono::Duration::days(30)));

        let mut opts = options();
        opts.target_id = Some("meta1".to_string());
        let scheduler = Scheduler::new(store.clone(), store.clone(), opts);

        let code = scheduler.run().await.unwrap();
        assert_eq!(code, 0);
        assert_eq!(store.result_count(), 1);
    }

    #[tokio::test]
    async fn test_allowlist_narrows_fetch() {
        let store = MemoryStore::new();
        store.push_label(acquisition("meta1", Utc::now() - chrono::Duration::seconds(30)));
        store.push_label(acquisition("meta2", Utc::now() - chrono::Duration::seconds(20)));

        let mut opts = options();
        opts.allowed_ids = Some(vec!["meta2".to_string()]);
        let scheduler = Scheduler::new(store.clone(), store.clone(), opts);
        let mut state = PollState::new(BACK_IN_TIME_DEFAULT);

        scheduler.cycle(&mut state).await.unwrap();

        let results = store.results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata_id, "meta2");
    }

    #[tokio::test]
    async fn test_ceiling_returns_stop_as_exit_code() {
        let store = MemoryStore::new();
        store.push_label(acquisition("meta1", Utc::now() - chrono::Duration::seconds(30)));

        let mut opts = options();
        opts.stop = Some(1);
        let scheduler = Scheduler::new(store.clone(), store.clone(), opts);

        let code = scheduler.run().await.unwrap();
        assert_eq!(code, 1);
        assert_eq!(store.result_count(), 1);
    }

    struct FailingSource;

    #[async_trait]
    impl LabelSource for FailingSource {
        async fn fetch_labels(
            &self,
            _filter: &LabelFilter,
            _skip: usize,
            _limit: usize,
        ) -> Result<LabelPage, StoreError> {
            Err(StoreError::Status(
                reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }

    #[tokio::test]
    async fn test_cycle_error_is_not_fatal_for_single_use() {
        let sink = MemoryStore::new();
        let mut opts = options();
        opts.target_id = Some("meta1".to_string());
        let scheduler = Scheduler::new(FailingSource, sink.clone(), opts);

        // the failing cycle is logged and swallowed; single-use still
        // terminates normally
        let code = scheduler.run().await.unwrap();
        assert_eq!(code, 0);
        assert_eq!(sink.result_count(), 0);
    }
}
