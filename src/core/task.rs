use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One validated task listing.
///
/// `id` is the dedup key persisted in the seen-id cache. For scraped
/// listings it is the raw `href` exactly as it appeared in the page, so
/// cache files written by earlier runs keep matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Absolute URL of the listing.
    pub link: String,
    pub category: Option<String>,
    pub discovered_at: DateTime<Utc>,
}

/// Kind of announcement sent for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateKind {
    New,
    BidAccepted,
    Funded,
}

impl UpdateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::BidAccepted => "bid-accepted",
            Self::Funded => "funded",
        }
    }
}

impl std::fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a listing href against the site's base URL.
///
/// Absolute `http`/`https` hrefs are returned unchanged; protocol-relative
/// hrefs are given `https:`. Anything else is treated as a site path.
pub fn resolve_link(href: &str, base_url: &str) -> String {
    let href = href.trim();
    if href.starts_with("//") {
        return format!("https:{href}");
    }
    if url::Url::parse(href).is_ok_and(|parsed| matches!(parsed.scheme(), "http" | "https")) {
        return href.to_string();
    }

    let base = base_url.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{base}{href}")
    } else {
        format!("{base}/{href}")
    }
}
