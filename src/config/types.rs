use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub discord: DiscordConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub extractor: ExtractorConfig,

    #[serde(default)]
    pub monitor: MonitorConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub filters: FilterConfig,

    #[serde(default)]
    pub development: DevelopmentConfig,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            log_level: default_log_level(),
            discord: DiscordConfig::default(),
            source: SourceConfig::default(),
            extractor: ExtractorConfig::default(),
            monitor: MonitorConfig::default(),
            storage: StorageConfig::default(),
            filters: FilterConfig::default(),
            development: DevelopmentConfig::default(),
        }
    }
}

// ── Discord ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Channel that receives task announcements.
    #[serde(default)]
    pub channel_id: String,
    /// Required for slash-command registration; commands are disabled without it.
    #[serde(default)]
    pub application_id: Option<String>,
    /// Register commands for one guild only (instant propagation).
    #[serde(default)]
    pub guild_id: Option<String>,
    /// User IDs allowed to run `/refresh` besides guild administrators.
    #[serde(default)]
    pub admin_users: Vec<String>,
    /// Role IDs mentioned alongside new-task announcements.
    #[serde(default)]
    pub mention_roles: Vec<String>,
    #[serde(default)]
    pub activity_name: Option<String>,
}

// ── Source ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_tasks_url")]
    pub tasks_url: String,
    /// Candidate JSON endpoints, tried in order against `base_url`.
    #[serde(default = "default_api_paths")]
    pub api_paths: Vec<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts for the HTML page after a transient failure.
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_base_url() -> String {
    "https://slopwork.xyz".into()
}

fn default_tasks_url() -> String {
    "https://slopwork.xyz/tasks".into()
}

fn default_api_paths() -> Vec<String> {
    vec![
        "/api/tasks".into(),
        "/api/v1/tasks".into(),
        "/tasks.json".into(),
    ]
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    5000
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            tasks_url: default_tasks_url(),
            api_paths: default_api_paths(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

// ── Extractor ───────────────────────────────────────────────────

/// Ordered CSS selector guesses used to find tasks in the HTML page.
///
/// Each list is joined into one selector group, so the first descendant
/// matching any entry wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_candidate_selectors")]
    pub candidates: Vec<String>,
    #[serde(default = "default_title_selectors")]
    pub title: Vec<String>,
    #[serde(default = "default_description_selectors")]
    pub description: Vec<String>,
    #[serde(default = "default_link_selectors")]
    pub link: Vec<String>,
    #[serde(default = "default_category_selectors")]
    pub category: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn default_candidate_selectors() -> Vec<String> {
    strings(&[".task-item", "[class*=\"task\"]", "article"])
}

fn default_title_selectors() -> Vec<String> {
    strings(&["h1", "h2", "h3", "h4", ".title", "[class*=\"title\"]"])
}

fn default_description_selectors() -> Vec<String> {
    strings(&["p", ".description", "[class*=\"description\"]"])
}

fn default_link_selectors() -> Vec<String> {
    strings(&["a"])
}

fn default_category_selectors() -> Vec<String> {
    strings(&["[class*=\"type\"]", ".badge", ".tag"])
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            candidates: default_candidate_selectors(),
            title: default_title_selectors(),
            description: default_description_selectors(),
            link: default_link_selectors(),
            category: default_category_selectors(),
        }
    }
}

// ── Monitor ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Cron expression; 5-field crontab syntax or 6/7-field with seconds.
    #[serde(default = "default_schedule")]
    pub schedule: String,
    /// Minimum spacing between two announcements.
    #[serde(default = "default_notify_interval_ms")]
    pub notify_interval_ms: u64,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
    /// Mark a task seen even when its announcement failed.
    #[serde(default)]
    pub mark_seen_on_failure: bool,
}

fn default_schedule() -> String {
    "*/5 * * * *".into()
}

fn default_notify_interval_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            schedule: default_schedule(),
            notify_interval_ms: default_notify_interval_ms(),
            run_on_startup: true,
            mark_seen_on_failure: false,
        }
    }
}

// ── Storage ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,
}

fn default_cache_file() -> PathBuf {
    PathBuf::from("./task_cache.json")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cache_file: default_cache_file(),
        }
    }
}

// ── Filters ─────────────────────────────────────────────────────

/// Announcement filters. Empty lists disable the corresponding check.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub task_types: Vec<String>,
    #[serde(default)]
    pub include_keywords: Vec<String>,
    #[serde(default)]
    pub exclude_keywords: Vec<String>,
}

// ── Development ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevelopmentConfig {
    /// Log announcements instead of posting them to Discord.
    #[serde(default)]
    pub dry_run: bool,
}
