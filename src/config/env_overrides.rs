use super::Config;
use std::path::PathBuf;

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Some(token) = non_empty("DISCORD_TOKEN") {
            self.discord.bot_token = token;
        }

        if let Some(channel) = non_empty("CHANNEL_ID") {
            self.discord.channel_id = channel;
        }

        if let Some(app_id) = non_empty("APPLICATION_ID") {
            self.discord.application_id = Some(app_id);
        }

        if let Some(guild) = non_empty("GUILD_ID") {
            self.discord.guild_id = Some(guild);
        }

        if let Some(admins) = non_empty("ADMIN_USER_IDS") {
            self.discord.admin_users = comma_list(&admins);
        }

        if let Some(roles) = non_empty("MENTION_ROLES") {
            self.discord.mention_roles = comma_list(&roles);
        }

        if let Some(schedule) = non_empty("CHECK_INTERVAL") {
            self.monitor.schedule = schedule;
        }

        if let Some(base_url) = non_empty("SLOPWORK_URL") {
            self.source.base_url = base_url;
        }

        if let Some(tasks_url) = non_empty("TASKS_URL") {
            self.source.tasks_url = tasks_url;
        }

        if let Some(cache_file) = non_empty("CACHE_FILE") {
            self.storage.cache_file = PathBuf::from(cache_file);
        }

        if let Some(raw) = non_empty("REQUEST_TIMEOUT_SECS")
            && let Ok(secs) = raw.trim().parse::<u64>()
            && secs > 0
        {
            self.source.timeout_secs = secs;
        }

        if let Some(raw) = non_empty("MAX_RETRIES")
            && let Ok(retries) = raw.trim().parse::<u32>()
        {
            self.source.retries = retries;
        }

        if let Some(raw) = non_empty("RETRY_DELAY")
            && let Ok(ms) = raw.trim().parse::<u64>()
        {
            self.source.retry_backoff_ms = ms;
        }

        if let Some(raw) = non_empty("REQUEST_DELAY")
            && let Ok(ms) = raw.trim().parse::<u64>()
        {
            self.monitor.notify_interval_ms = ms;
        }

        if let Some(types) = non_empty("FILTER_TYPES") {
            self.filters.task_types = comma_list(&types);
        }

        if let Some(keywords) = non_empty("INCLUDE_KEYWORDS") {
            self.filters.include_keywords = comma_list(&keywords);
        }

        if let Some(keywords) = non_empty("EXCLUDE_KEYWORDS") {
            self.filters.exclude_keywords = comma_list(&keywords);
        }

        if let Some(level) = non_empty("LOG_LEVEL") {
            self.log_level = level;
        }

        if let Some(dry_run) = non_empty("DRY_RUN") {
            self.development.dry_run = is_truthy(&dry_run);
        }
    }
}
