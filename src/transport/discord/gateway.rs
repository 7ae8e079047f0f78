use anyhow::{Context, Result};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, mpsc};
use tokio::time::{Instant, interval};
use tokio_tungstenite::tungstenite::Message;

use super::http_client::DiscordHttpClient;
use super::types::{DEFAULT_HEARTBEAT_INTERVAL_MS, GatewayOpcode};

const FALLBACK_GATEWAY_URL: &str = "wss://gateway.discord.gg";

/// Session data kept across reconnects so the gateway can resume.
#[derive(Debug)]
pub struct GatewaySession {
    pub session_id: Mutex<Option<String>>,
    pub sequence: AtomicI64,
    pub resume_gateway_url: Mutex<Option<String>>,
}

impl Default for GatewaySession {
    fn default() -> Self {
        Self {
            session_id: Mutex::new(None),
            sequence: AtomicI64::new(-1),
            resume_gateway_url: Mutex::new(None),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    Ready {
        session_id: String,
        resume_gateway_url: String,
        user_id: String,
        application_id: Option<String>,
    },
    InteractionCreate(Interaction),
}

/// Fields of an `INTERACTION_CREATE` payload the bot acts on.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub id: String,
    pub token: String,
    pub kind: u64,
    pub application_id: Option<String>,
    pub channel_id: Option<String>,
    pub guild_id: Option<String>,
    pub user_id: String,
    /// Resolved permission bitfield of the invoking member (guild only).
    pub member_permissions: Option<u64>,
    pub data: Value,
}

pub struct DiscordGateway {
    bot_token: String,
    intents: u64,
    session: Arc<GatewaySession>,
    presence: Option<Value>,
}

impl DiscordGateway {
    pub fn new(
        bot_token: String,
        intents: u64,
        session: Arc<GatewaySession>,
        presence: Option<Value>,
    ) -> Self {
        Self {
            bot_token,
            intents,
            session,
            presence,
        }
    }

    /// Run one websocket connection until Discord asks for a reconnect or the
    /// socket drops. Returns `Ok(())` when reconnecting is appropriate.
    pub async fn connect_and_listen(
        &self,
        http: &DiscordHttpClient,
        tx: &mpsc::Sender<GatewayEvent>,
    ) -> Result<()> {
        let gateway_url = self.resolve_gateway_url(http).await?;
        let ws_url = build_gateway_ws_url(&gateway_url);

        let (ws_stream, _) = tokio_tungstenite::connect_async(&ws_url)
            .await
            .with_context(|| format!("connect Discord gateway websocket: {ws_url}"))?;
        let (mut write, mut read) = ws_stream.split();

        let heartbeat_interval_ms = read_hello_heartbeat_interval(&mut read).await?;
        self.send_identify_or_resume(&mut write).await?;

        let mut heartbeat = interval(Duration::from_millis(heartbeat_interval_ms));
        let heartbeat_acked = AtomicBool::new(true);
        let mut ack_deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    if !self
                        .send_heartbeat_if_healthy(&mut write, &heartbeat_acked, &mut ack_deadline, heartbeat_interval_ms)
                        .await?
                    {
                        tracing::warn!("Discord gateway heartbeat ACK missing; reconnecting");
                        return Ok(());
                    }
                }
                () = wait_for_ack_timeout(ack_deadline) => {
                    if !heartbeat_acked.load(Ordering::SeqCst) {
                        tracing::warn!("Discord gateway heartbeat ACK timeout; reconnecting");
                        return Ok(());
                    }
                    ack_deadline = None;
                }
                message = read.next() => {
                    let Some(message) = message else {
                        tracing::warn!("Discord gateway socket closed; reconnecting");
                        return Ok(());
                    };

                    let message = message.context("read Discord gateway message")?;
                    if !self
                        .handle_gateway_message(message, tx, &mut write, &heartbeat_acked, &mut ack_deadline, heartbeat_interval_ms)
                        .await?
                    {
                        return Ok(());
                    }
                }
            }
        }
    }

    async fn resolve_gateway_url(&self, http: &DiscordHttpClient) -> Result<String> {
        if let Some(url) = self.session.resume_gateway_url.lock().await.clone()
            && !url.is_empty()
        {
            return Ok(url);
        }

        let bot = http
            .get_gateway_bot()
            .await
            .context("fetch Discord gateway/bot URL")?;
        Ok(bot
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or(FALLBACK_GATEWAY_URL)
            .to_string())
    }

    async fn send_identify_or_resume<WsSink>(&self, write: &mut WsSink) -> Result<()>
    where
        WsSink: Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
    {
        let session_id = self.session.session_id.lock().await.clone();
        let payload = match session_id {
            Some(session_id) => resume_payload(&self.bot_token, &session_id, self.sequence_value()),
            None => identify_payload(&self.bot_token, self.intents, self.presence.as_ref()),
        };

        write
            .send(Message::Text(payload.to_string().into()))
            .await
            .context("send Discord gateway identify/resume")
    }

    async fn send_heartbeat_if_healthy<WsSink>(
        &self,
        write: &mut WsSink,
        heartbeat_acked: &AtomicBool,
        ack_deadline: &mut Option<Instant>,
        heartbeat_interval_ms: u64,
    ) -> Result<bool>
    where
        WsSink: Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
    {
        if !heartbeat_acked.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let payload = json!({
            "op": GatewayOpcode::Heartbeat as u8,
            "d": self.sequence_json(),
        });

        write
            .send(Message::Text(payload.to_string().into()))
            .await
            .context("send Discord gateway heartbeat")?;

        heartbeat_acked.store(false, Ordering::SeqCst);
        *ack_deadline = Some(Instant::now() + Duration::from_millis(heartbeat_interval_ms));
        Ok(true)
    }

    async fn handle_gateway_message<WsSink>(
        &self,
        message: Message,
        tx: &mpsc::Sender<GatewayEvent>,
        write: &mut WsSink,
        heartbeat_acked: &AtomicBool,
        ack_deadline: &mut Option<Instant>,
        heartbeat_interval_ms: u64,
    ) -> Result<bool>
    where
        WsSink: Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
    {
        let Some(raw) = websocket_message_to_text(message) else {
            return Ok(true);
        };

        let payload: Value = serde_json::from_str(&raw).context("parse Discord gateway payload")?;

        if let Some(sequence) = payload.get("s").and_then(Value::as_i64) {
            self.session.sequence.store(sequence, Ordering::SeqCst);
        }

        let op = payload
            .get("op")
            .and_then(Value::as_u64)
            .and_then(GatewayOpcode::from_u64);

        match op {
            Some(GatewayOpcode::Heartbeat) => {
                self.send_heartbeat_if_healthy(
                    write,
                    heartbeat_acked,
                    ack_deadline,
                    heartbeat_interval_ms,
                )
                .await
            }
            Some(GatewayOpcode::HeartbeatAck) => {
                heartbeat_acked.store(true, Ordering::SeqCst);
                *ack_deadline = None;
                Ok(true)
            }
            Some(GatewayOpcode::Reconnect) => {
                tracing::info!("Discord gateway requested reconnect");
                Ok(false)
            }
            Some(GatewayOpcode::InvalidSession) => {
                self.handle_invalid_session(&payload).await;
                Ok(false)
            }
            Some(GatewayOpcode::Dispatch) => {
                self.handle_dispatch_payload(&payload, tx).await?;
                Ok(true)
            }
            _ => Ok(true),
        }
    }

    async fn handle_dispatch_payload(
        &self,
        payload: &Value,
        tx: &mpsc::Sender<GatewayEvent>,
    ) -> Result<()> {
        let event_type = payload.get("t").and_then(Value::as_str).unwrap_or("");
        let Some(data) = payload.get("d") else {
            return Ok(());
        };

        let Some(event) = parse_dispatch_event(event_type, data) else {
            return Ok(());
        };

        if let GatewayEvent::Ready {
            session_id,
            resume_gateway_url,
            ..
        } = &event
        {
            *self.session.session_id.lock().await = Some(session_id.clone());
            *self.session.resume_gateway_url.lock().await = Some(resume_gateway_url.clone());
        }

        tx.send(event)
            .await
            .context("dispatch parsed Discord gateway event")
    }

    async fn handle_invalid_session(&self, payload: &Value) {
        let can_resume = payload.get("d").and_then(Value::as_bool).unwrap_or(false);

        self.session.sequence.store(-1, Ordering::SeqCst);
        *self.session.session_id.lock().await = None;

        if can_resume {
            let wait_secs = invalid_session_backoff_secs();
            tracing::warn!(
                "Discord gateway invalid session (resume allowed), waiting {wait_secs}s before reconnect"
            );
            tokio::time::sleep(Duration::from_secs(wait_secs)).await;
            return;
        }

        tracing::warn!("Discord gateway invalid session (resume denied), clearing resume URL");
        *self.session.resume_gateway_url.lock().await = None;
    }

    fn sequence_json(&self) -> Value {
        let sequence = self.sequence_value();
        if sequence < 0 {
            Value::Null
        } else {
            json!(sequence)
        }
    }

    fn sequence_value(&self) -> i64 {
        self.session.sequence.load(Ordering::SeqCst)
    }
}

/// Presence shown while connected: "Watching {activity_name}".
pub fn watching_presence(activity_name: &str) -> Value {
    json!({
        "since": Value::Null,
        "activities": [{ "name": activity_name, "type": 3 }],
        "status": "online",
        "afk": false,
    })
}

fn identify_payload(token: &str, intents: u64, presence: Option<&Value>) -> Value {
    let mut data = json!({
        "token": token,
        "intents": intents,
        "properties": {
            "os": std::env::consts::OS,
            "browser": "slopwatch",
            "device": "slopwatch"
        }
    });
    if let Some(presence) = presence {
        data["presence"] = presence.clone();
    }
    json!({ "op": GatewayOpcode::Identify as u8, "d": data })
}

fn resume_payload(token: &str, session_id: &str, sequence: i64) -> Value {
    json!({
        "op": GatewayOpcode::Resume as u8,
        "d": { "token": token, "session_id": session_id, "seq": sequence }
    })
}

pub fn parse_dispatch_event(event_type: &str, d: &Value) -> Option<GatewayEvent> {
    match event_type {
        "READY" => parse_ready_event(d),
        "INTERACTION_CREATE" => parse_interaction(d).map(GatewayEvent::InteractionCreate),
        "RESUMED" => {
            tracing::info!("Discord gateway session resumed");
            None
        }
        _ => None,
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn parse_ready_event(d: &Value) -> Option<GatewayEvent> {
    Some(GatewayEvent::Ready {
        session_id: str_field(d, "session_id")?,
        resume_gateway_url: str_field(d, "resume_gateway_url")?,
        user_id: str_field(d.get("user")?, "id")?,
        application_id: d.get("application").and_then(|app| str_field(app, "id")),
    })
}

fn parse_interaction(d: &Value) -> Option<Interaction> {
    let member = d.get("member");
    let user_id = member
        .and_then(|member| member.get("user"))
        .or_else(|| d.get("user"))
        .and_then(|user| str_field(user, "id"))?;

    // Discord serializes the permission bitfield as a decimal string.
    let member_permissions = member
        .and_then(|member| member.get("permissions"))
        .and_then(|permissions| match permissions {
            Value::String(bits) => bits.parse::<u64>().ok(),
            other => other.as_u64(),
        });

    Some(Interaction {
        id: str_field(d, "id")?,
        token: str_field(d, "token")?,
        kind: d.get("type")?.as_u64()?,
        application_id: str_field(d, "application_id"),
        channel_id: str_field(d, "channel_id"),
        guild_id: str_field(d, "guild_id"),
        user_id,
        member_permissions,
        data: d.get("data").cloned().unwrap_or(Value::Null),
    })
}

async fn wait_for_ack_timeout(deadline: Option<Instant>) {
    if let Some(deadline) = deadline {
        tokio::time::sleep_until(deadline).await;
    } else {
        futures_util::future::pending::<()>().await;
    }
}

async fn read_hello_heartbeat_interval<WsRead>(read: &mut WsRead) -> Result<u64>
where
    WsRead:
        Stream<Item = std::result::Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    while let Some(message) = read.next().await {
        let message = message.context("read Discord gateway hello payload")?;
        let Some(raw) = websocket_message_to_text(message) else {
            continue;
        };

        let payload: Value =
            serde_json::from_str(&raw).context("parse Discord gateway hello JSON")?;
        if let Some(interval_ms) = hello_heartbeat_interval(&payload) {
            return Ok(interval_ms);
        }
    }

    Err(anyhow::anyhow!("Discord gateway closed before Hello"))
}

fn hello_heartbeat_interval(payload: &Value) -> Option<u64> {
    let op = payload
        .get("op")
        .and_then(Value::as_u64)
        .and_then(GatewayOpcode::from_u64)?;
    (op == GatewayOpcode::Hello).then(|| {
        payload
            .get("d")
            .and_then(|d| d.get("heartbeat_interval"))
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_HEARTBEAT_INTERVAL_MS)
    })
}

fn websocket_message_to_text(message: Message) -> Option<String> {
    match message {
        Message::Text(text) => Some(text.to_string()),
        Message::Binary(bytes) => String::from_utf8(bytes.to_vec()).ok(),
        _ => None,
    }
}

fn build_gateway_ws_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    format!("{trimmed}/?v=10&encoding=json")
}

fn invalid_session_backoff_secs() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.subsec_nanos())
        .unwrap_or(0);
    1 + u64::from(nanos % 5)
}
