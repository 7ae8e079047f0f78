//! Embed payloads for task announcements and command replies.

use serde_json::{Value, json};

use super::types::{
    EMBED_DESCRIPTION_LIMIT, EMBED_FIELD_VALUE_LIMIT, EMBED_TITLE_LIMIT, EMBED_TOTAL_LIMIT,
    MAX_EMBEDS_PER_MESSAGE,
};
use crate::commands::CommandResult;
use crate::core::task::{TaskRecord, UpdateKind};

pub const FOOTER_TEXT: &str = "Slopwork.xyz Task Monitor";

pub const COLOR_NEW: u32 = 0x00ff00;
pub const COLOR_BID_ACCEPTED: u32 = 0xffaa00;
pub const COLOR_FUNDED: u32 = 0x0099ff;

/// Truncate to at most `limit` characters, never splitting a code point.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

fn heading(kind: UpdateKind) -> (&'static str, u32) {
    match kind {
        UpdateKind::New => ("🆕 New Task", COLOR_NEW),
        UpdateKind::BidAccepted => ("✅ Bid Accepted", COLOR_BID_ACCEPTED),
        UpdateKind::Funded => ("💰 Task Funded", COLOR_FUNDED),
    }
}

/// Announcement embed for one task.
pub fn build_task_embed(task: &TaskRecord, kind: UpdateKind) -> Value {
    let (prefix, color) = heading(kind);
    let title = format!("{prefix}: {}", task.title);

    let mut embed = json!({
        "title": truncate_chars(&title, EMBED_TITLE_LIMIT),
        "url": task.link,
        "color": color,
        "timestamp": task.discovered_at.to_rfc3339(),
        "footer": { "text": FOOTER_TEXT },
    });

    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        embed["description"] = json!(truncate_chars(description, EMBED_DESCRIPTION_LIMIT));
    }

    if kind == UpdateKind::New
        && let Some(category) = task.category.as_deref().filter(|c| !c.is_empty())
    {
        embed["fields"] = json!([{
            "name": "Type",
            "value": truncate_chars(category, EMBED_FIELD_VALUE_LIMIT),
            "inline": true,
        }]);
    }

    embed
}

/// Message body for one announcement, with role mentions when configured.
pub fn build_announcement(task: &TaskRecord, kind: UpdateKind, mention_roles: &[String]) -> Value {
    let mut payload = json!({ "embeds": [build_task_embed(task, kind)] });

    let mentions: Vec<String> = mention_roles
        .iter()
        .map(|role| role.trim())
        .filter(|role| !role.is_empty())
        .map(|role| format!("<@&{role}>"))
        .collect();
    if !mentions.is_empty() {
        payload["content"] = json!(mentions.join(" "));
        payload["allowed_mentions"] = json!({ "parse": ["roles"] });
    }

    payload
}

fn text_chars(value: &Value) -> usize {
    value.as_str().map_or(0, |text| text.chars().count())
}

/// Characters Discord counts towards the per-message embed total.
pub fn embed_chars(embed: &Value) -> usize {
    let fields = embed["fields"].as_array().map_or(0, |fields| {
        fields
            .iter()
            .map(|field| text_chars(&field["name"]) + text_chars(&field["value"]))
            .sum()
    });
    text_chars(&embed["title"])
        + text_chars(&embed["description"])
        + text_chars(&embed["footer"]["text"])
        + fields
}

/// Interaction reply body: text plus one embed per listed task.
///
/// Stays within the embed count and combined size limits: descriptions are
/// shortened first, then trailing embeds are dropped. Ephemerality is fixed
/// by the deferred response, so no flags are set here.
pub fn build_command_reply(result: &CommandResult) -> Value {
    let mut budget = EMBED_TOTAL_LIMIT;
    let mut embeds = Vec::new();

    for task in result.tasks.iter().take(MAX_EMBEDS_PER_MESSAGE) {
        let mut embed = build_task_embed(task, UpdateKind::New);
        let size = embed_chars(&embed);
        if size > budget {
            let fixed = size - text_chars(&embed["description"]);
            if fixed > budget {
                break;
            }
            let room = budget - fixed;
            let shortened = embed["description"]
                .as_str()
                .map(|text| truncate_chars(text, room).to_string())
                .filter(|text| !text.is_empty());
            match (shortened, embed.as_object_mut()) {
                (Some(text), _) => embed["description"] = json!(text),
                (None, Some(object)) => {
                    object.remove("description");
                }
                (None, None) => {}
            }
        }
        budget -= embed_chars(&embed);
        embeds.push(embed);
    }

    json!({ "content": result.text, "embeds": embeds })
}
