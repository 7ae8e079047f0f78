mod report;

pub use report::{ApiProbe, CheckReport, Probe};

use crate::config::Config;
use crate::core::extract::TaskExtractor;
use crate::core::source::http;
use anyhow::Result;
use std::time::Duration;

const PAGE_TIMEOUT: Duration = Duration::from_secs(10);
const API_TIMEOUT: Duration = Duration::from_secs(5);

/// Extra endpoint worth probing even though the fetcher does not use it.
const EXTRA_API_CANDIDATE: &str = "/api/tasks.json";

pub async fn run(config: &Config) -> Result<()> {
    println!("◆ slopwatch check");
    println!();

    let extractor = TaskExtractor::new(&config.extractor)?;
    let report = collect(config, &extractor).await?;

    println!("  Target Site");
    println!("  {}", "─".repeat(50));
    for line in report.lines() {
        println!("  {line}");
    }
    println!();

    let issues = report.issues();
    if issues == 0 {
        println!("  All checks passed.");
    } else {
        println!("  {issues} issue(s) found.");
    }
    Ok(())
}

/// Probe the site, the tasks page and the candidate API endpoints.
pub async fn collect(config: &Config, extractor: &TaskExtractor) -> Result<CheckReport> {
    let source = &config.source;
    let page_client = http::build_client_with_timeout(&source.user_agent, PAGE_TIMEOUT)?;
    let api_client = http::build_client_with_timeout(&source.user_agent, API_TIMEOUT)?;

    let mut report = CheckReport::default();

    let (site, _) = probe(&page_client, &source.base_url).await;
    report.site = Some(site);

    let (tasks_page, body) = probe(&page_client, &source.tasks_url).await;
    report.tasks_page = Some(tasks_page);
    if let Some(html) = body {
        report.coverage = extractor.selector_coverage(&html);
        report.sample = extractor.extract(&html, &source.base_url).into_iter().next();
    }

    report.api = probe_api(&api_client, config).await;
    Ok(report)
}

async fn probe(client: &reqwest::Client, url: &str) -> (Probe, Option<String>) {
    match http::get_text(client, url).await {
        Ok(body) => (
            Probe {
                url: url.to_string(),
                ok: true,
                detail: format!("{} bytes", body.len()),
            },
            Some(body),
        ),
        Err(error) => (
            Probe {
                url: url.to_string(),
                ok: false,
                detail: error.to_string(),
            },
            None,
        ),
    }
}

async fn probe_api(client: &reqwest::Client, config: &Config) -> Option<ApiProbe> {
    let mut candidates: Vec<&str> = config.source.api_paths.iter().map(String::as_str).collect();
    if !candidates.contains(&EXTRA_API_CANDIDATE) {
        candidates.push(EXTRA_API_CANDIDATE);
    }

    for path in candidates {
        let url = http::endpoint_url(&config.source.base_url, path);
        match http::get_text(client, &url).await {
            Ok(body) if !body.trim().is_empty() => {
                return Some(ApiProbe {
                    path: path.to_string(),
                    body_kind: body_kind(&body),
                });
            }
            Ok(_) => tracing::debug!(%url, "API candidate returned an empty body"),
            Err(error) => tracing::debug!(%url, %error, "API candidate unavailable"),
        }
    }
    None
}

fn body_kind(body: &str) -> &'static str {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Array(_)) => "array",
        Ok(serde_json::Value::Object(_)) => "object",
        Ok(_) => "scalar",
        Err(_) => "text",
    }
}
