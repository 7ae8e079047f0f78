//! Shared HTTP plumbing for listing fetches.

use crate::config::SourceConfig;
use crate::error::FetchError;
use std::time::Duration;

/// Build the client used for every listing request.
///
/// Every request is bounded by `timeout_secs`; a hung site can stall one
/// attempt but never a whole poll cycle.
pub fn build_client(config: &SourceConfig) -> Result<reqwest::Client, FetchError> {
    build_client_with_timeout(&config.user_agent, Duration::from_secs(config.timeout_secs))
}

pub fn build_client_with_timeout(
    user_agent: &str,
    timeout: Duration,
) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| FetchError::Client(e.to_string()))
}

/// GET `url` and return the body of a 2xx response.
pub async fn get_text(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| FetchError::Body {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// GET `url` and parse a 2xx body as JSON.
pub async fn get_json(
    client: &reqwest::Client,
    url: &str,
) -> Result<serde_json::Value, FetchError> {
    let body = get_text(client, url).await?;
    serde_json::from_str(&body).map_err(|e| FetchError::Body {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Join an API path onto the base URL.
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}
