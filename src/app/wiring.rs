//! Builds the pipeline collaborators from configuration.

use crate::config::Config;
use crate::core::extract::TaskExtractor;
use crate::core::notify::{LogNotifier, Notifier};
use crate::core::poller::{Poller, PollerOptions};
use crate::core::source::{ListingSource, TaskFetcher};
use crate::core::store::JsonFileStore;
use crate::transport::discord::DiscordNotifier;
use crate::transport::discord::http_client::DiscordHttpClient;
use crate::error::Result;
use std::sync::Arc;

/// Listing source with validated selectors and a bounded HTTP client.
pub fn build_fetcher(config: &Config) -> Result<TaskFetcher> {
    let extractor = TaskExtractor::new(&config.extractor)?;
    Ok(TaskFetcher::new(config.source.clone(), extractor)?)
}

/// Discord REST client, or `None` for dry runs.
pub fn build_discord_http(config: &Config) -> Option<Arc<DiscordHttpClient>> {
    (!config.development.dry_run)
        .then(|| Arc::new(DiscordHttpClient::new(config.discord.bot_token.clone())))
}

pub fn build_notifier(config: &Config, http: Option<&Arc<DiscordHttpClient>>) -> Arc<dyn Notifier> {
    match http {
        Some(http) => Arc::new(DiscordNotifier::new(
            Arc::clone(http),
            config.discord.channel_id.clone(),
            config.discord.mention_roles.clone(),
        )),
        None => Arc::new(LogNotifier),
    }
}

/// Poller with the seen cache loaded from `storage.cache_file`.
pub async fn build_poller(
    config: &Config,
    source: Arc<dyn ListingSource>,
    notifier: Arc<dyn Notifier>,
) -> Poller {
    let store = Arc::new(JsonFileStore::new(config.storage.cache_file.clone()));
    let poller = Poller::load(source, store, notifier, PollerOptions::from_config(config)).await;
    tracing::info!(
        cache = %config.storage.cache_file.display(),
        seen = poller.seen().await.len(),
        "Loaded seen-task cache"
    );
    poller
}
