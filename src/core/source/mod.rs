pub mod api;
pub mod http;

use crate::config::SourceConfig;
use crate::core::extract::TaskExtractor;
use crate::core::task::TaskRecord;
use crate::error::FetchError;
use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;

const MAX_BACKOFF_MS: u64 = 30_000;

/// Anything that can produce the current task listings.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Current listings in source order. Failures are logged and yield an
    /// empty vector.
    async fn fetch_listings(&self) -> Vec<TaskRecord>;
}

/// Fetches listings from the JSON API when one answers, else scrapes the
/// tasks page.
pub struct TaskFetcher {
    client: reqwest::Client,
    config: SourceConfig,
    extractor: TaskExtractor,
}

impl TaskFetcher {
    pub fn new(config: SourceConfig, extractor: TaskExtractor) -> Result<Self, FetchError> {
        Ok(Self {
            client: http::build_client(&config)?,
            config,
            extractor,
        })
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Try each candidate API path in order; the first JSON array wins.
    ///
    /// Returns `None` when no candidate answered with an array.
    pub async fn fetch_from_api(&self) -> Option<Vec<TaskRecord>> {
        for path in &self.config.api_paths {
            let url = http::endpoint_url(&self.config.base_url, path);
            let items = match http::get_json(&self.client, &url).await {
                Ok(serde_json::Value::Array(items)) => items,
                Ok(_) => {
                    tracing::debug!(%url, "API candidate did not return an array");
                    continue;
                }
                Err(error) => {
                    tracing::debug!(%url, %error, "API candidate unavailable");
                    continue;
                }
            };

            let discovered_at = Utc::now();
            let tasks: Vec<TaskRecord> = items
                .iter()
                .filter_map(|item| api::normalize_listing(item, &self.config.base_url, discovered_at))
                .collect();
            tracing::debug!(%url, listed = items.len(), valid = tasks.len(), "API listings fetched");
            return Some(tasks);
        }
        None
    }

    /// Scrape the tasks page. Errors are logged and yield no tasks.
    pub async fn fetch_from_html(&self) -> Vec<TaskRecord> {
        match self.fetch_page().await {
            Ok(html) => self.extractor.extract(&html, &self.config.base_url),
            Err(error) => {
                tracing::error!(url = %self.config.tasks_url, %error, "Error fetching tasks");
                Vec::new()
            }
        }
    }

    /// GET the tasks page, retrying transient failures with exponential backoff.
    pub async fn fetch_page(&self) -> Result<String, FetchError> {
        let mut backoff_ms = self.config.retry_backoff_ms;
        let mut attempt = 0;
        loop {
            match http::get_text(&self.client, &self.config.tasks_url).await {
                Ok(body) => return Ok(body),
                Err(error) if error.is_transient() && attempt < self.config.retries => {
                    attempt += 1;
                    tracing::warn!(
                        %error,
                        attempt,
                        retry_in_ms = backoff_ms,
                        "tasks page fetch failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms = backoff_ms.saturating_mul(2).min(MAX_BACKOFF_MS);
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[async_trait]
impl ListingSource for TaskFetcher {
    async fn fetch_listings(&self) -> Vec<TaskRecord> {
        if let Some(tasks) = self.fetch_from_api().await {
            return tasks;
        }
        self.fetch_from_html().await
    }
}
