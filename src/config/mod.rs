mod env_overrides;
mod loader;
#[cfg(test)]
pub(crate) mod test_env;
mod types;

pub use types::{
    Config, DevelopmentConfig, DiscordConfig, ExtractorConfig, FilterConfig, MonitorConfig,
    SourceConfig, StorageConfig,
};
