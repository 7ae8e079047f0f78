use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use reqwest::{Method, Response, header::HeaderMap};
use serde_json::{Value, json};
use tokio::{sync::Mutex, time::sleep};

use super::types::API_BASE;

const MAX_RATE_LIMIT_RETRIES: u8 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
struct RateLimitBucket {
    remaining: u32,
    reset_at: f64,
}

/// Discord REST client with per-route and global rate-limit tracking.
pub struct DiscordHttpClient {
    client: reqwest::Client,
    base_url: String,
    bot_token: String,
    buckets: Arc<Mutex<HashMap<String, RateLimitBucket>>>,
    global_reset_at: Arc<Mutex<Option<f64>>>,
}

impl DiscordHttpClient {
    #[must_use]
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self::with_base_url(bot_token, API_BASE)
    }

    /// Point the client at another API root (mock servers, proxies).
    #[must_use]
    pub fn with_base_url(bot_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            buckets: Arc::new(Mutex::new(HashMap::new())),
            global_reset_at: Arc::new(Mutex::new(None)),
        }
    }

    /// Post a message (content and/or embeds) to a channel.
    pub async fn create_message(&self, channel_id: &str, payload: &Value) -> Result<Value> {
        let url = format!("{}/channels/{channel_id}/messages", self.base_url);
        let response = self
            .request(Method::POST, &url, Some(payload))
            .await
            .context("send Discord message")?;
        response
            .json()
            .await
            .context("parse Discord send message response JSON")
    }

    pub async fn get_channel(&self, channel_id: &str) -> Result<Value> {
        let url = format!("{}/channels/{channel_id}", self.base_url);
        let response = self
            .request(Method::GET, &url, None)
            .await
            .context("fetch Discord channel")?;
        response.json().await.context("parse Discord channel JSON")
    }

    pub async fn get_current_user(&self) -> Result<Value> {
        let url = format!("{}/users/@me", self.base_url);
        let response = self
            .request(Method::GET, &url, None)
            .await
            .context("fetch current Discord user")?;
        response
            .json()
            .await
            .context("parse current Discord user JSON")
    }

    pub async fn get_gateway_bot(&self) -> Result<Value> {
        let url = format!("{}/gateway/bot", self.base_url);
        let response = self
            .request(Method::GET, &url, None)
            .await
            .context("fetch Discord gateway bot data")?;
        response
            .json()
            .await
            .context("parse Discord gateway bot JSON")
    }

    pub async fn create_interaction_response(
        &self,
        interaction_id: &str,
        interaction_token: &str,
        response_type: u8,
        data: Option<Value>,
    ) -> Result<()> {
        let url = format!(
            "{}/interactions/{interaction_id}/{interaction_token}/callback",
            self.base_url
        );
        let mut body = json!({ "type": response_type });
        if let Some(payload) = data {
            body["data"] = payload;
        }
        let _response = self
            .request(Method::POST, &url, Some(&body))
            .await
            .context("create Discord interaction response")?;
        Ok(())
    }

    pub async fn edit_original_interaction_response(
        &self,
        application_id: &str,
        interaction_token: &str,
        payload: &Value,
    ) -> Result<()> {
        let url = format!(
            "{}/webhooks/{application_id}/{interaction_token}/messages/@original",
            self.base_url
        );
        let _response = self
            .request(Method::PATCH, &url, Some(payload))
            .await
            .context("edit original Discord interaction response")?;
        Ok(())
    }

    pub async fn register_commands(
        &self,
        application_id: &str,
        guild_id: Option<&str>,
        commands: &[Value],
    ) -> Result<()> {
        let url = if let Some(guild) = guild_id {
            format!(
                "{}/applications/{application_id}/guilds/{guild}/commands",
                self.base_url
            )
        } else {
            format!("{}/applications/{application_id}/commands", self.base_url)
        };

        let body = json!(commands);
        let _response = self
            .request(Method::PUT, &url, Some(&body))
            .await
            .context("register Discord application commands")?;
        Ok(())
    }

    async fn request(&self, method: Method, url: &str, body: Option<&Value>) -> Result<Response> {
        let route_key = Self::bucket_key_from_url(url);
        self.wait_for_limits(&route_key).await;

        for attempt in 0..=MAX_RATE_LIMIT_RETRIES {
            let mut request_builder = self
                .client
                .request(method.clone(), url)
                .header("Authorization", format!("Bot {}", self.bot_token));
            if let Some(payload) = body {
                request_builder = request_builder.json(payload);
            }

            let response = request_builder
                .send()
                .await
                .with_context(|| format!("send Discord request {} {}", method.as_str(), url))?;

            self.update_bucket_from_headers(&route_key, response.headers())
                .await;

            if response.status().as_u16() == 429 {
                if attempt == MAX_RATE_LIMIT_RETRIES {
                    anyhow::bail!(
                        "Discord request {} {} exceeded rate limit after {} retries",
                        method.as_str(),
                        url,
                        MAX_RATE_LIMIT_RETRIES
                    );
                }
                let is_global = Self::is_global_limit(response.headers());
                let retry_after = Self::parse_retry_after(response.headers())
                    .unwrap_or_else(|| Duration::from_secs(1));
                self.handle_429_wait(is_global, retry_after, &route_key)
                    .await;
                continue;
            }

            if !response.status().is_success() {
                let status = response.status();
                let body_text = response
                    .text()
                    .await
                    .unwrap_or_else(|error| format!("<failed to read response body: {error}>"));
                anyhow::bail!(
                    "Discord request {} {} failed ({status}): {body_text}",
                    method.as_str(),
                    url
                );
            }

            return Ok(response);
        }

        anyhow::bail!(
            "Discord request {} {} failed due to rate limiting",
            method.as_str(),
            url
        )
    }

    fn parse_header_u32(headers: &HeaderMap, name: &str) -> Option<u32> {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u32>().ok())
    }

    fn parse_header_f64(headers: &HeaderMap, name: &str) -> Option<f64> {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<f64>().ok())
    }

    fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
        let seconds = Self::parse_header_f64(headers, "Retry-After")?;
        if seconds <= 0.0 {
            return Some(Duration::from_secs(0));
        }
        Duration::try_from_secs_f64(seconds).ok()
    }

    fn is_global_limit(headers: &HeaderMap) -> bool {
        headers
            .get("X-RateLimit-Global")
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }

    fn now_unix_timestamp() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64()
    }

    /// Route key with snowflake IDs and interaction/webhook tokens collapsed,
    /// e.g. `/channels/{id}/messages`.
    fn bucket_key_from_url(url: &str) -> String {
        let path = reqwest::Url::parse(url)
            .map_or_else(|_| url.to_string(), |parsed| parsed.path().to_string());
        let path_without_api_prefix = path
            .strip_prefix("/api/v10")
            .map_or(path.as_str(), |stripped| stripped);

        let segments: Vec<&str> = path_without_api_prefix
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        let normalized = segments
            .iter()
            .enumerate()
            .map(|(index, segment)| {
                let follows_token_owner = index >= 2
                    && matches!(segments[index - 2], "interactions" | "webhooks");
                if follows_token_owner {
                    "{token}".to_string()
                } else if segment.chars().all(|character| character.is_ascii_digit()) {
                    "{id}".to_string()
                } else {
                    (*segment).to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("/");

        format!("/{normalized}")
    }

    async fn wait_for_limits(&self, route_key: &str) {
        let now = Self::now_unix_timestamp();
        let global_wait = {
            let global_guard = self.global_reset_at.lock().await;
            global_guard.and_then(|reset_at| (reset_at > now).then_some(reset_at - now))
        };
        if let Some(wait) = global_wait.and_then(|secs| Duration::try_from_secs_f64(secs).ok()) {
            sleep(wait).await;
        }

        let route_wait = {
            let buckets = self.buckets.lock().await;
            buckets.get(route_key).and_then(|bucket| {
                if bucket.remaining == 0 && bucket.reset_at > now {
                    Some(bucket.reset_at - now)
                } else {
                    None
                }
            })
        };
        if let Some(wait) = route_wait.and_then(|secs| Duration::try_from_secs_f64(secs).ok()) {
            sleep(wait).await;
        }
    }

    async fn handle_429_wait(&self, is_global: bool, retry_after: Duration, route_key: &str) {
        let now = Self::now_unix_timestamp();
        let reset_at = now + retry_after.as_secs_f64();
        if is_global {
            let mut global = self.global_reset_at.lock().await;
            *global = Some(reset_at);
        } else {
            let mut buckets = self.buckets.lock().await;
            buckets.insert(
                route_key.to_string(),
                RateLimitBucket {
                    remaining: 0,
                    reset_at,
                },
            );
        }
        sleep(retry_after).await;
    }

    async fn update_bucket_from_headers(&self, route_key: &str, headers: &HeaderMap) {
        let remaining = Self::parse_header_u32(headers, "X-RateLimit-Remaining");
        let reset_at = Self::parse_header_f64(headers, "X-RateLimit-Reset");

        if let (Some(remaining), Some(reset_at)) = (remaining, reset_at) {
            let mut buckets = self.buckets.lock().await;
            buckets.insert(
                route_key.to_string(),
                RateLimitBucket {
                    remaining,
                    reset_at,
                },
            );
        }
    }
}
