use crate::core::task::{TaskRecord, resolve_link};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Map one element of a JSON listings array onto a [`TaskRecord`].
///
/// The endpoint's schema is unknown, so common field names are accepted:
/// `id`/`link`/`url` for the key, `title`/`name`, `link`/`url`,
/// `description`, `type`/`category`. Elements without a usable id, title
/// and link are dropped.
pub fn normalize_listing(
    value: &Value,
    base_url: &str,
    discovered_at: DateTime<Utc>,
) -> Option<TaskRecord> {
    let raw_link = string_field(value, &["link", "url", "href"]);
    let id = id_field(value).or_else(|| raw_link.clone())?;
    let title = string_field(value, &["title", "name"])?;

    let link = match raw_link {
        Some(raw) => resolve_link(&raw, base_url),
        None => resolve_link(&format!("/tasks/{id}"), base_url),
    };

    Some(TaskRecord {
        id,
        title,
        description: string_field(value, &["description", "summary"]),
        link,
        category: string_field(value, &["type", "category"]),
        discovered_at,
    })
}

fn id_field(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        value
            .get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}
