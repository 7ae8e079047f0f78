//! Discord API constants and type definitions.

/// Discord API base URL (v10).
pub const API_BASE: &str = "https://discord.com/api/v10";

/// Gateway intents: GUILDS (1) only. Slash-command interactions need no
/// privileged intents.
pub const DEFAULT_INTENTS: u64 = intents::GUILDS;

/// Default heartbeat interval when server does not provide one (ms).
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 41250;

/// Embed title limit (characters).
pub const EMBED_TITLE_LIMIT: usize = 256;

/// Embed description limit (characters).
pub const EMBED_DESCRIPTION_LIMIT: usize = 4096;

/// Embed field value limit (characters).
pub const EMBED_FIELD_VALUE_LIMIT: usize = 1024;

/// Combined characters across every embed of one message.
pub const EMBED_TOTAL_LIMIT: usize = 6000;

/// Maximum embeds in a single message.
pub const MAX_EMBEDS_PER_MESSAGE: usize = 10;

/// Message flag hiding a reply from everyone but the invoking user.
pub const MESSAGE_FLAG_EPHEMERAL: u64 = 1 << 6;

/// ADMINISTRATOR permission bit.
pub const PERMISSION_ADMINISTRATOR: u64 = 1 << 3;

/// Gateway opcodes used in the Discord WebSocket protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GatewayOpcode {
    /// An event was dispatched (server → client).
    Dispatch = 0,
    /// Fired periodically to keep the connection alive.
    Heartbeat = 1,
    /// Starts a new session during the initial handshake.
    Identify = 2,
    /// Resume a previous session that was disconnected.
    Resume = 6,
    /// Server is telling the client to reconnect.
    Reconnect = 7,
    /// The session has been invalidated.
    InvalidSession = 9,
    /// Sent immediately after connecting; contains heartbeat interval.
    Hello = 10,
    /// Acknowledges a received heartbeat.
    HeartbeatAck = 11,
}

impl GatewayOpcode {
    /// Convert a raw u64 value to an opcode we handle.
    pub fn from_u64(value: u64) -> Option<Self> {
        match value {
            0 => Some(Self::Dispatch),
            1 => Some(Self::Heartbeat),
            2 => Some(Self::Identify),
            6 => Some(Self::Resume),
            7 => Some(Self::Reconnect),
            9 => Some(Self::InvalidSession),
            10 => Some(Self::Hello),
            11 => Some(Self::HeartbeatAck),
            _ => None,
        }
    }
}

/// Discord interaction types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InteractionType {
    Ping = 1,
    ApplicationCommand = 2,
    MessageComponent = 3,
    ApplicationCommandAutocomplete = 4,
    ModalSubmit = 5,
}

impl InteractionType {
    pub fn from_u64(value: u64) -> Option<Self> {
        match value {
            1 => Some(Self::Ping),
            2 => Some(Self::ApplicationCommand),
            3 => Some(Self::MessageComponent),
            4 => Some(Self::ApplicationCommandAutocomplete),
            5 => Some(Self::ModalSubmit),
            _ => None,
        }
    }
}

/// Interaction callback types for responding to interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InteractionCallbackType {
    /// Respond to an interaction with a message.
    ChannelMessageWithSource = 4,
    /// ACK an interaction and edit a response later (shows "thinking...").
    DeferredChannelMessageWithSource = 5,
}

/// Application command option types used by our commands.
pub mod option_type {
    pub const INTEGER: u8 = 4;
}

/// Individual intent bit flags.
pub mod intents {
    pub const GUILDS: u64 = 1 << 0;
}
