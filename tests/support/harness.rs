#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use slopwatch::config::{Config, SourceConfig};
use slopwatch::core::notify::Notifier;
use slopwatch::core::poller::{Poller, PollerOptions};
use slopwatch::core::source::{ListingSource, TaskFetcher};
use slopwatch::core::store::{JsonFileStore, SeenIdSet};
use slopwatch::core::task::{TaskRecord, UpdateKind};
use slopwatch::core::TaskExtractor;
use slopwatch::error::NotifyError;
use tokio::time::Duration;

/// Tasks page with one valid candidate (`/t/1`) and one missing its title.
pub const TWO_CANDIDATE_PAGE: &str = r#"
<html><body>
  <div class="task-item">
    <h3>Fix bug</h3>
    <p>Crash on startup</p>
    <a href="/t/1">Open</a>
  </div>
  <div class="task-item">
    <p>No title here</p>
    <a href="/t/2">Open</a>
  </div>
</body></html>
"#;

pub fn task(id: &str) -> TaskRecord {
    TaskRecord {
        id: id.to_string(),
        title: format!("Task {id}"),
        description: None,
        link: format!("https://slopwork.xyz{id}"),
        category: None,
        discovered_at: Utc::now(),
    }
}

/// Source config pointed at a mock server, without retries.
pub fn source_config(base_url: &str) -> SourceConfig {
    SourceConfig {
        base_url: base_url.to_string(),
        tasks_url: format!("{base_url}/tasks"),
        timeout_secs: 5,
        retries: 0,
        retry_backoff_ms: 10,
        ..SourceConfig::default()
    }
}

pub fn config_for(base_url: &str) -> Config {
    let mut config = Config::default();
    config.source = source_config(base_url);
    config
}

pub fn fetcher_for(base_url: &str) -> TaskFetcher {
    let config = Config::default();
    let extractor = TaskExtractor::new(&config.extractor).expect("default selectors compile");
    TaskFetcher::new(source_config(base_url), extractor).expect("client builds")
}

pub fn fast_options() -> PollerOptions {
    PollerOptions {
        notify_interval: Duration::ZERO,
        ..PollerOptions::default()
    }
}

/// Fixed listings, counted per fetch.
pub struct StaticSource {
    tasks: Vec<TaskRecord>,
    fetches: Mutex<usize>,
}

impl StaticSource {
    pub fn new(tasks: Vec<TaskRecord>) -> Self {
        Self {
            tasks,
            fetches: Mutex::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        *self.fetches.lock().expect("fetch counter")
    }
}

#[async_trait]
impl ListingSource for StaticSource {
    async fn fetch_listings(&self) -> Vec<TaskRecord> {
        *self.fetches.lock().expect("fetch counter") += 1;
        self.tasks.clone()
    }
}

/// Records every announcement; ids listed in `failing` are rejected.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, UpdateKind)>>,
    failing: Vec<String>,
    delay: Option<Duration>,
}

impl RecordingNotifier {
    pub fn failing(ids: &[&str]) -> Self {
        Self {
            failing: ids.iter().map(|id| (*id).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn sent_ids(&self) -> Vec<String> {
        self.sent
            .lock()
            .expect("sent log")
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, task: &TaskRecord, kind: UpdateKind) -> Result<(), NotifyError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(&task.id) {
            return Err(NotifyError::Delivery {
                channel: "test".into(),
                message: format!("rejected {}", task.id),
            });
        }
        self.sent
            .lock()
            .expect("sent log")
            .push((task.id.clone(), kind));
        Ok(())
    }
}

pub struct Rig {
    pub poller: Arc<Poller>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Poller over `source` with a JSON store at `cache_path`.
pub async fn rig(
    source: Arc<dyn ListingSource>,
    notifier: RecordingNotifier,
    cache_path: &std::path::Path,
    options: PollerOptions,
) -> Rig {
    let notifier = Arc::new(notifier);
    let store = Arc::new(JsonFileStore::new(cache_path));
    let poller = Poller::load(source, store, Arc::clone(&notifier) as Arc<dyn Notifier>, options)
        .await;
    Rig {
        poller: Arc::new(poller),
        notifier,
    }
}

pub fn ids(seen: &SeenIdSet) -> Vec<String> {
    seen.iter().map(str::to_string).collect()
}
