//! Interactive search orchestration.
//!
//! Rapid input is debounced: a submission only reaches the catalog once no newer submission
//! arrived during the quiet period. Every submission is tagged with a ticket from a monotonic
//! sequencer, and a response is applied only while its ticket is still the latest issued, so a
//! slow stale response can never overwrite fresher results.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::catalog::CatalogApi;
use crate::models::{Category, MovieSummary};
use crate::pipeline::{derive, QueryCriteria};
use crate::Result;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_latest(&self, ticket: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub ticket: u64,
    pub criteria: QueryCriteria,
    pub total_results: u32,
    pub movies: Vec<MovieSummary>,
}

pub struct SearchSession {
    catalog: Arc<dyn CatalogApi>,
    sequencer: RequestSequencer,
    quiet_period: Duration,
    latest: Mutex<Option<SearchOutcome>>,
}

impl SearchSession {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self::with_quiet_period(catalog, DEFAULT_QUIET_PERIOD)
    }

    pub fn with_quiet_period(catalog: Arc<dyn CatalogApi>, quiet_period: Duration) -> Self {
        Self {
            catalog,
            sequencer: RequestSequencer::new(),
            quiet_period,
            latest: Mutex::new(None),
        }
    }

    /// Submits new criteria. Returns `Ok(None)` when a newer submission superseded this one,
    /// either before the fetch started or while it was in flight.
    pub async fn submit(&self, criteria: QueryCriteria) -> Result<Option<SearchOutcome>> {
        let ticket = self.sequencer.issue();
        tokio::time::sleep(self.quiet_period).await;
        if !self.sequencer.is_latest(ticket) {
            debug!(ticket, "Submission superseded during quiet period");
            return Ok(None);
        }

        let fetched = match criteria.term() {
            Some(term) => {
                info!(ticket, "Searching catalog for '{}'", term);
                self.catalog.search(term, 1).await
            }
            None => {
                info!(ticket, "Loading popular movies");
                self.catalog
                    .list_by_category(Category::Popular.as_path(), 1)
                    .await
            }
        };

        let mut latest = self.latest.lock().await;
        if !self.sequencer.is_latest(ticket) {
            debug!(ticket, "Discarding stale response");
            return Ok(None);
        }
        let page = fetched.inspect_err(|e| warn!(ticket, "Search failed: {}", e))?;

        let outcome = SearchOutcome {
            ticket,
            total_results: page.total_results,
            movies: derive(&page.results, &criteria),
            criteria,
        };
        *latest = Some(outcome.clone());
        Ok(Some(outcome))
    }

    /// The most recently applied outcome, if any.
    pub async fn latest(&self) -> Option<SearchOutcome> {
        self.latest.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_newest_ticket_is_latest() {
        let sequencer = RequestSequencer::new();
        let first = sequencer.issue();
        assert!(sequencer.is_latest(first));
        let second = sequencer.issue();
        assert!(second > first);
        assert!(!sequencer.is_latest(first));
        assert!(sequencer.is_latest(second));
    }
}
