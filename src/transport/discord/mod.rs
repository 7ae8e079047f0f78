pub mod commands;
pub mod embed;
pub mod gateway;
pub mod http_client;
pub mod notifier;
pub mod types;

use crate::commands::{Caller, handle_command, parse_command};
use crate::config::DiscordConfig;
use crate::core::poller::Poller;
use std::sync::Arc;
use tokio::sync::mpsc;

use self::gateway::{DiscordGateway, GatewayEvent, GatewaySession, Interaction, watching_presence};
use self::http_client::DiscordHttpClient;
use self::types::{DEFAULT_INTENTS, InteractionType, PERMISSION_ADMINISTRATOR};

pub use self::notifier::DiscordNotifier;

/// Gateway side of the bot: answers `/tasks` and `/refresh`.
pub struct DiscordBot {
    http: Arc<DiscordHttpClient>,
    session: Arc<GatewaySession>,
    config: DiscordConfig,
    poller: Arc<Poller>,
    application_id: std::sync::Mutex<Option<String>>,
}

impl DiscordBot {
    pub fn new(config: DiscordConfig, http: Arc<DiscordHttpClient>, poller: Arc<Poller>) -> Self {
        let application_id = config
            .application_id
            .clone()
            .filter(|id| !id.trim().is_empty());
        Self {
            http,
            session: Arc::new(GatewaySession::default()),
            config,
            poller,
            application_id: std::sync::Mutex::new(application_id),
        }
    }

    fn presence(&self) -> Option<serde_json::Value> {
        self.config
            .activity_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .map(watching_presence)
    }

    fn matches_guild_filter(&self, guild_id: Option<&str>) -> bool {
        match &self.config.guild_id {
            Some(gid) => guild_id.is_some_and(|g| g == gid),
            None => true,
        }
    }

    fn application_id(&self) -> Option<String> {
        self.application_id
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }

    fn remember_application_id(&self, id: &str) {
        if let Ok(mut guard) = self.application_id.lock()
            && guard.is_none()
        {
            *guard = Some(id.to_string());
        }
    }

    /// Token sanity check: resolves the bot's own user.
    pub async fn health_check(&self) -> bool {
        match self.http.get_current_user().await {
            Ok(user) => {
                let name = user
                    .get("username")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("unknown");
                tracing::info!("Discord: authenticated as {name}");
                true
            }
            Err(e) => {
                tracing::error!("Discord: token check failed: {e:#}");
                false
            }
        }
    }

    /// Run one gateway connection until it drops. The caller restarts it.
    pub async fn listen(self: &Arc<Self>) -> anyhow::Result<()> {
        let gateway = DiscordGateway::new(
            self.config.bot_token.clone(),
            DEFAULT_INTENTS,
            Arc::clone(&self.session),
            self.presence(),
        );

        let (event_tx, mut event_rx) = mpsc::channel::<GatewayEvent>(100);

        let mut gateway_handle = {
            let http = Arc::clone(&self.http);
            tokio::spawn(async move { gateway.connect_and_listen(&http, &event_tx).await })
        };

        loop {
            tokio::select! {
                event = event_rx.recv() => {
                    let Some(event) = event else {
                        break;
                    };
                    self.handle_gateway_event(event).await;
                }
                result = &mut gateway_handle => {
                    match result {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => return Err(e),
                        Err(e) => anyhow::bail!("Discord gateway task panicked: {e}"),
                    }
                    break;
                }
            }
        }

        Ok(())
    }

    async fn handle_gateway_event(self: &Arc<Self>, event: GatewayEvent) {
        match event {
            GatewayEvent::Ready {
                user_id,
                application_id,
                ..
            } => {
                self.handle_ready(&user_id, application_id.as_deref())
                    .await;
            }
            GatewayEvent::InteractionCreate(interaction) => {
                // Refresh can run a whole poll cycle; keep the event loop free.
                let bot = Arc::clone(self);
                tokio::spawn(async move { bot.handle_interaction(interaction).await });
            }
        }
    }

    async fn handle_ready(&self, user_id: &str, application_id: Option<&str>) {
        tracing::info!("Discord: connected as user {user_id}");
        if let Some(id) = application_id {
            self.remember_application_id(id);
        }

        if let Err(e) = self.http.get_channel(&self.config.channel_id).await {
            tracing::warn!(
                channel = %self.config.channel_id,
                "Discord: announcement channel is not reachable: {e:#}"
            );
        }

        let Some(app_id) = self.application_id() else {
            tracing::warn!("Discord: no application id, slash commands not registered");
            return;
        };
        match commands::register_commands(&self.http, &app_id, self.config.guild_id.as_deref())
            .await
        {
            Ok(()) => tracing::info!("Discord: slash commands registered"),
            Err(e) => tracing::warn!("Discord: failed to register slash commands: {e:#}"),
        }
    }

    async fn handle_interaction(&self, interaction: Interaction) {
        if InteractionType::from_u64(interaction.kind) != Some(InteractionType::ApplicationCommand)
        {
            return;
        }
        if !self.matches_guild_filter(interaction.guild_id.as_deref()) {
            return;
        }
        let Some(command) = parse_command(&interaction.data) else {
            return;
        };

        if let Err(e) = commands::defer_interaction(
            &self.http,
            &interaction.id,
            &interaction.token,
            commands::is_ephemeral(command),
        )
        .await
        {
            tracing::warn!("Discord: failed to defer interaction: {e:#}");
            return;
        }

        let caller = Caller {
            user_id: interaction.user_id.clone(),
            is_admin: interaction
                .member_permissions
                .is_some_and(|bits| bits & PERMISSION_ADMINISTRATOR != 0),
        };
        let result =
            handle_command(command, &self.poller, &caller, &self.config.admin_users).await;

        let Some(app_id) = interaction
            .application_id
            .clone()
            .or_else(|| self.application_id())
        else {
            tracing::warn!("Discord: cannot answer interaction without an application id");
            return;
        };
        if let Err(e) =
            commands::send_interaction_reply(&self.http, &app_id, &interaction.token, &result)
                .await
        {
            tracing::warn!("Discord: failed to send interaction reply: {e:#}");
        }
    }
}
