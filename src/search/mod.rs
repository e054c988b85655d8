//! Debounced place search
//!
//! Watches the search box text and turns bursts of edits into settled,
//! distinct lookups:
//!
//! - every edit restarts a quiet window (500 ms by default)
//! - a settled value equal to the last *emitted* one is dropped
//! - an empty settled value clears the results without calling the provider
//! - anything else is lower-cased and looked up once
//!
//! Only the most recently issued lookup may publish results. Issuing a new
//! one aborts the previous, and completions are tagged with a generation so
//! a straggler can never overwrite newer results. Lookup failures are logged
//! and leave the results as they were.

use crate::error::Result;
use crate::geo::{PlaceLookup, PlaceResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

/// Current result list; `None` is the "no results" state
pub type SearchResults = Option<Vec<PlaceResult>>;

/// Debounced search over a [`PlaceLookup`] provider
///
/// Dropping the debouncer stops the timer and aborts any in-flight lookup.
#[derive(Debug)]
pub struct SearchDebouncer {
    query: watch::Sender<String>,
    results: watch::Receiver<SearchResults>,
    issued: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl SearchDebouncer {
    /// Start the debounce task on the current tokio runtime
    pub fn spawn<L: PlaceLookup>(lookup: Arc<L>, window: Duration) -> Self {
        let (query_tx, query_rx) = watch::channel(String::new());
        let (results_tx, results_rx) = watch::channel(None);
        let issued = Arc::new(AtomicU64::new(0));

        let worker = Worker {
            lookup,
            window,
            query: query_rx,
            results: results_tx,
            issued: issued.clone(),
        };
        let task = tokio::spawn(worker.run());

        Self {
            query: query_tx,
            results: results_rx,
            issued,
            task,
        }
    }

    /// Replace the search text; every call counts as an edit
    pub fn set_query(&self, text: impl Into<String>) {
        self.query.send_replace(text.into());
    }

    /// Current search text
    pub fn query(&self) -> String {
        self.query.borrow().clone()
    }

    /// Subscribe to result list updates
    pub fn results(&self) -> watch::Receiver<SearchResults> {
        self.results.clone()
    }

    /// Number of provider lookups issued so far
    pub fn lookups_issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Completion of one lookup, tagged with the generation that issued it
type Completion = (u64, Result<Vec<PlaceResult>>);

struct Worker<L> {
    lookup: Arc<L>,
    window: Duration,
    query: watch::Receiver<String>,
    results: watch::Sender<SearchResults>,
    issued: Arc<AtomicU64>,
}

impl<L: PlaceLookup> Worker<L> {
    async fn run(mut self) {
        // Dropping the set (on return or abort) aborts every lookup in it
        let mut in_flight: JoinSet<Completion> = JoinSet::new();
        let mut deadline: Option<Instant> = None;
        let mut last_emitted: Option<String> = None;
        let mut generation: u64 = 0;

        loop {
            tokio::select! {
                changed = self.query.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    deadline = Some(Instant::now() + self.window);
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    deadline = None;
                    let settled = self.query.borrow_and_update().clone();
                    if last_emitted.as_deref() == Some(settled.as_str()) {
                        debug!(query = %settled, "duplicate query suppressed");
                        continue;
                    }
                    last_emitted = Some(settled.clone());
                    generation += 1;
                    in_flight.abort_all();

                    if settled.is_empty() {
                        self.results.send_replace(None);
                        continue;
                    }

                    self.issued.fetch_add(1, Ordering::Relaxed);
                    let lookup = self.lookup.clone();
                    let issued_as = generation;
                    let query = settled.to_lowercase();
                    debug!(%query, generation = issued_as, "issuing place lookup");
                    in_flight.spawn(async move { (issued_as, lookup.search(&query).await) });
                }
                Some(joined) = in_flight.join_next() => {
                    let Ok((issued_as, outcome)) = joined else {
                        continue;
                    };
                    if issued_as != generation {
                        debug!(generation = issued_as, "discarding superseded lookup");
                        continue;
                    }
                    match outcome {
                        Ok(places) => {
                            self.results.send_replace(Some(places));
                        }
                        Err(e) => warn!("place lookup failed: {}", e),
                    }
                }
            }
        }
    }
}
