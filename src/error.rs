use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Startup failures raised while building the pipeline.
///
/// Store and notify errors never escape a poll cycle; the poller logs them.
/// Application glue and the Discord client use `anyhow::Result` for ad-hoc
/// context chains.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("fetch: {0}")]
    Fetch(#[from] FetchError),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    #[error("invalid selector `{selector}` in [extractor].{rule}")]
    Selector { rule: &'static str, selector: String },

    #[error("invalid schedule `{expression}`: {reason}")]
    Schedule { expression: String, reason: String },
}

// ─── Fetch errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("unexpected body from {url}: {message}")]
    Body { url: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Body { .. } | Self::Client(_) => false,
        }
    }
}

// ─── Store errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize seen ids: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ─── Notify errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery to channel {channel} failed: {message}")]
    Delivery { channel: String, message: String },
}

pub type Result<T, E = WatchError> = std::result::Result<T, E>;
