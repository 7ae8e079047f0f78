use std::sync::Arc;

use async_trait::async_trait;

use super::embed::build_announcement;
use super::http_client::DiscordHttpClient;
use crate::core::notify::Notifier;
use crate::core::task::{TaskRecord, UpdateKind};
use crate::error::NotifyError;

/// Posts one embed per task to the announcement channel.
pub struct DiscordNotifier {
    http: Arc<DiscordHttpClient>,
    channel_id: String,
    mention_roles: Vec<String>,
}

impl DiscordNotifier {
    pub fn new(
        http: Arc<DiscordHttpClient>,
        channel_id: impl Into<String>,
        mention_roles: Vec<String>,
    ) -> Self {
        Self {
            http,
            channel_id: channel_id.into(),
            mention_roles,
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn name(&self) -> &str {
        "discord"
    }

    async fn notify(&self, task: &TaskRecord, kind: UpdateKind) -> Result<(), NotifyError> {
        let payload = build_announcement(task, kind, &self.mention_roles);
        self.http
            .create_message(&self.channel_id, &payload)
            .await
            .map(|_| ())
            .map_err(|error| NotifyError::Delivery {
                channel: self.channel_id.clone(),
                message: format!("{error:#}"),
            })
    }
}
