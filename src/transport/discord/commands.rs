use anyhow::Result;
use serde_json::{Value, json};

use super::embed::build_command_reply;
use super::http_client::DiscordHttpClient;
use super::types::{InteractionCallbackType, MESSAGE_FLAG_EPHEMERAL, option_type};
use crate::commands::{CommandResult, MAX_LIST_LIMIT, SlashCommand};

/// Application command definitions for `/tasks` and `/refresh`.
pub fn build_slash_commands() -> Vec<Value> {
    vec![
        json!({
            "name": "tasks",
            "description": "Show the latest tasks on Slopwork.xyz",
            "type": 1,
            "options": [
                {
                    "name": "limit",
                    "description": "Number of tasks to show (default 5)",
                    "type": option_type::INTEGER,
                    "required": false,
                    "min_value": 1,
                    "max_value": MAX_LIST_LIMIT
                }
            ]
        }),
        json!({
            "name": "refresh",
            "description": "Check for new tasks now (admin only)",
            "type": 1
        }),
    ]
}

pub async fn register_commands(
    http: &DiscordHttpClient,
    application_id: &str,
    guild_id: Option<&str>,
) -> Result<()> {
    http.register_commands(application_id, guild_id, &build_slash_commands())
        .await
}

/// Refresh replies are private to the invoking user.
pub fn is_ephemeral(command: SlashCommand) -> bool {
    matches!(command, SlashCommand::Refresh)
}

pub async fn defer_interaction(
    http: &DiscordHttpClient,
    interaction_id: &str,
    interaction_token: &str,
    ephemeral: bool,
) -> Result<()> {
    let data = ephemeral.then(|| json!({ "flags": MESSAGE_FLAG_EPHEMERAL }));
    http.create_interaction_response(
        interaction_id,
        interaction_token,
        InteractionCallbackType::DeferredChannelMessageWithSource as u8,
        data,
    )
    .await
}

pub async fn send_interaction_reply(
    http: &DiscordHttpClient,
    application_id: &str,
    interaction_token: &str,
    result: &CommandResult,
) -> Result<()> {
    http.edit_original_interaction_response(
        application_id,
        interaction_token,
        &build_command_reply(result),
    )
    .await
}
