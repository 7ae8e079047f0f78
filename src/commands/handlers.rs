use crate::core::poller::{PollOutcome, Poller};
use crate::core::source::ListingSource;
use crate::core::task::TaskRecord;

use super::types::{Caller, CommandResult, RefreshReply, SlashCommand};

pub const DEFAULT_LIST_LIMIT: usize = 5;
pub const MAX_LIST_LIMIT: usize = 10;

/// Clamp a requested listing size to `1..=MAX_LIST_LIMIT`.
pub fn clamp_limit(requested: Option<i64>) -> usize {
    match requested {
        None => DEFAULT_LIST_LIMIT,
        Some(n) if n < 1 => 1,
        Some(n) => usize::try_from(n).map_or(MAX_LIST_LIMIT, |n| n.min(MAX_LIST_LIMIT)),
    }
}

/// The first listings in source order. Never touches the seen cache.
pub async fn list_tasks(source: &dyn ListingSource, limit: Option<i64>) -> Vec<TaskRecord> {
    let limit = clamp_limit(limit);
    let mut tasks = source.fetch_listings().await;
    tasks.truncate(limit);
    tasks
}

pub fn is_privileged(caller: &Caller, admin_users: &[String]) -> bool {
    caller.is_admin || admin_users.iter().any(|id| id.trim() == caller.user_id)
}

/// Run a poll cycle on behalf of a privileged caller.
pub async fn refresh(poller: &Poller, caller: &Caller, admin_users: &[String]) -> RefreshReply {
    if !is_privileged(caller, admin_users) {
        tracing::warn!(user = %caller.user_id, "Refusing /refresh from unprivileged user");
        return RefreshReply::Denied;
    }

    tracing::info!(user = %caller.user_id, "Manual refresh requested");
    match poller.poll_once().await {
        PollOutcome::Completed(report) => RefreshReply::Completed(report),
        PollOutcome::Busy => RefreshReply::Busy,
    }
}

pub async fn handle_command(
    command: SlashCommand,
    poller: &Poller,
    caller: &Caller,
    admin_users: &[String],
) -> CommandResult {
    match command {
        SlashCommand::Tasks { limit } => {
            let source = poller.source();
            CommandResult::listing(list_tasks(source.as_ref(), limit).await)
        }
        SlashCommand::Refresh => {
            CommandResult::ephemeral(refresh(poller, caller, admin_users).await.message())
        }
    }
}
