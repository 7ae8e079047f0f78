//! Change detection: fetch → diff against the seen cache → notify → persist.

mod filter;
mod throttle;

pub use filter::TaskFilter;
pub use throttle::Throttle;

use crate::config::Config;
use crate::core::notify::Notifier;
use crate::core::source::ListingSource;
use crate::core::store::{SeenIdSet, SeenStore};
use crate::core::task::{TaskRecord, UpdateKind};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Duration;

/// Consecutive failed saves before the failure is logged as an error.
const SAVE_FAILURE_ALERT_THRESHOLD: u32 = 3;

#[derive(Debug, Clone)]
pub struct PollerOptions {
    pub notify_interval: Duration,
    /// Mark a task seen even when its delivery failed.
    pub mark_seen_on_failure: bool,
    pub filter: TaskFilter,
}

impl PollerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            notify_interval: Duration::from_millis(config.monitor.notify_interval_ms),
            mark_seen_on_failure: config.monitor.mark_seen_on_failure,
            filter: TaskFilter::from_config(&config.filters),
        }
    }
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self {
            notify_interval: Duration::from_secs(1),
            mark_seen_on_failure: false,
            filter: TaskFilter::default(),
        }
    }
}

/// Counters for one completed poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    pub fetched: usize,
    /// Unseen tasks that passed the filters.
    pub new: usize,
    pub filtered: usize,
    pub notified: usize,
    pub failed: usize,
    pub persisted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Completed(PollReport),
    /// Another cycle was already running; nothing was done.
    Busy,
}

impl PollOutcome {
    /// Number of tasks announced by this cycle.
    pub fn notified(&self) -> usize {
        match self {
            Self::Completed(report) => report.notified,
            Self::Busy => 0,
        }
    }
}

struct PollState {
    seen: SeenIdSet,
    throttle: Throttle,
    consecutive_save_failures: u32,
}

/// Owns the seen-id cache and runs poll cycles one at a time.
pub struct Poller {
    source: Arc<dyn ListingSource>,
    store: Arc<dyn SeenStore>,
    notifier: Arc<dyn Notifier>,
    options: PollerOptions,
    state: Mutex<PollState>,
}

impl Poller {
    /// Build a poller with the cache loaded from `store`.
    pub async fn load(
        source: Arc<dyn ListingSource>,
        store: Arc<dyn SeenStore>,
        notifier: Arc<dyn Notifier>,
        options: PollerOptions,
    ) -> Self {
        let seen = store.load().await;
        Self::with_seen(source, store, notifier, options, seen)
    }

    pub fn with_seen(
        source: Arc<dyn ListingSource>,
        store: Arc<dyn SeenStore>,
        notifier: Arc<dyn Notifier>,
        options: PollerOptions,
        seen: SeenIdSet,
    ) -> Self {
        let throttle = Throttle::new(options.notify_interval);
        Self {
            source,
            store,
            notifier,
            options,
            state: Mutex::new(PollState {
                seen,
                throttle,
                consecutive_save_failures: 0,
            }),
        }
    }

    pub fn source(&self) -> Arc<dyn ListingSource> {
        Arc::clone(&self.source)
    }

    /// Copy of the cache, waiting for any running cycle to finish.
    pub async fn seen(&self) -> SeenIdSet {
        self.state.lock().await.seen.clone()
    }

    /// Run one cycle unless another one is in flight.
    pub async fn poll_once(&self) -> PollOutcome {
        let Ok(mut state) = self.state.try_lock() else {
            tracing::info!("Poll cycle already running, skipping this trigger");
            return PollOutcome::Busy;
        };

        tracing::info!("Checking for new tasks...");
        let listings = self.source.fetch_listings().await;
        let fetched = listings.len();

        let unseen = new_tasks(listings, &state.seen);
        let (pending, skipped): (Vec<_>, Vec<_>) = unseen
            .into_iter()
            .partition(|task| self.options.filter.allows(task));

        let mut report = PollReport {
            fetched,
            new: pending.len(),
            filtered: skipped.len(),
            ..PollReport::default()
        };

        if pending.is_empty() {
            tracing::info!(fetched, filtered = report.filtered, "No new tasks found");
            return PollOutcome::Completed(report);
        }

        tracing::info!("Found {} new task(s)", pending.len());
        let mut added = 0usize;

        for task in &pending {
            state.throttle.acquire().await;

            let delivered = match self.notifier.notify(task, UpdateKind::New).await {
                Ok(()) => {
                    tracing::info!(id = %task.id, "Posted new task: {}", task.title);
                    report.notified += 1;
                    true
                }
                Err(error) => {
                    tracing::error!(
                        id = %task.id,
                        notifier = self.notifier.name(),
                        %error,
                        "Error posting task"
                    );
                    report.failed += 1;
                    false
                }
            };

            if (delivered || self.options.mark_seen_on_failure) && state.seen.insert(&task.id) {
                added += 1;
            }
        }

        if added > 0 {
            report.persisted = self.persist(&mut state).await;
        }

        tracing::info!(
            notified = report.notified,
            failed = report.failed,
            persisted = report.persisted,
            "Poll cycle complete"
        );
        PollOutcome::Completed(report)
    }

    async fn persist(&self, state: &mut PollState) -> bool {
        match self.store.save(&state.seen).await {
            Ok(()) => {
                state.consecutive_save_failures = 0;
                true
            }
            Err(error) => {
                state.consecutive_save_failures += 1;
                let failures = state.consecutive_save_failures;
                if failures >= SAVE_FAILURE_ALERT_THRESHOLD {
                    tracing::error!(
                        %error,
                        failures,
                        "Seen-task cache keeps failing to save; a restart will re-announce tasks"
                    );
                } else {
                    tracing::warn!(%error, "Error saving cache");
                }
                false
            }
        }
    }
}

/// Listings whose id is not in `seen`, in listing order.
///
/// A repeated id within the same batch is kept once.
pub fn new_tasks(listings: Vec<TaskRecord>, seen: &SeenIdSet) -> Vec<TaskRecord> {
    let mut batch = HashSet::new();
    listings
        .into_iter()
        .filter(|task| !seen.contains(&task.id) && batch.insert(task.id.clone()))
        .collect()
}
