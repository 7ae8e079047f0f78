//! Transport-agnostic handlers for the `/tasks` and `/refresh` commands.

pub mod handlers;
pub mod parser;
pub mod types;

pub use handlers::{
    DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT, clamp_limit, handle_command, is_privileged, list_tasks,
    refresh,
};
pub use parser::parse_command;
pub use types::{Caller, CommandResult, RefreshReply, SlashCommand};
