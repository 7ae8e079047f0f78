use serde_json::Value;

use super::types::SlashCommand;

/// Decode application-command interaction data (`{"name": .., "options": [..]}`).
pub fn parse_command(data: &Value) -> Option<SlashCommand> {
    let name = data.get("name")?.as_str()?;
    match name {
        "tasks" => Some(SlashCommand::Tasks {
            limit: integer_option(data, "limit"),
        }),
        "refresh" => Some(SlashCommand::Refresh),
        _ => None,
    }
}

fn integer_option(data: &Value, option: &str) -> Option<i64> {
    data.get("options")?
        .as_array()?
        .iter()
        .find(|opt| opt.get("name").and_then(Value::as_str) == Some(option))
        .and_then(|opt| opt.get("value"))
        .and_then(|value| match value {
            Value::String(raw) => raw.trim().parse().ok(),
            other => other.as_i64(),
        })
}
