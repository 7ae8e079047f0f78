use crate::core::poller::PollReport;
use crate::core::task::TaskRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashCommand {
    /// Show the current listings; `limit` is the raw user input.
    Tasks { limit: Option<i64> },
    /// Run a poll cycle now.
    Refresh,
}

/// Who invoked a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    /// Holds the guild Administrator permission.
    pub is_admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReply {
    Denied,
    Busy,
    Completed(PollReport),
}

impl RefreshReply {
    pub fn message(&self) -> String {
        match self {
            Self::Denied => "❌ You need administrator permissions to use this command.".into(),
            Self::Busy => "⏳ A check is already running, try again in a moment.".into(),
            Self::Completed(report) if report.notified == 0 => {
                "✅ Refresh complete. No new tasks found.".into()
            }
            Self::Completed(report) => format!(
                "✅ Refresh complete. Posted {} new task(s).",
                report.notified
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub text: String,
    pub ephemeral: bool,
    /// Listings to render alongside `text`.
    pub tasks: Vec<TaskRecord>,
}

impl CommandResult {
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ephemeral: true,
            tasks: Vec::new(),
        }
    }

    pub fn listing(tasks: Vec<TaskRecord>) -> Self {
        let text = if tasks.is_empty() {
            "No tasks found right now.".to_string()
        } else {
            format!("📋 Latest {} task(s) on Slopwork.xyz", tasks.len())
        };
        Self {
            text,
            ephemeral: false,
            tasks,
        }
    }
}
