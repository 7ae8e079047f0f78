use crate::core::task::{TaskRecord, UpdateKind};
use crate::error::NotifyError;
use async_trait::async_trait;

/// Delivery boundary for task announcements.
///
/// Implementations report failure through the returned `Result`; they must
/// not panic, so one bad delivery never aborts a poll cycle.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    async fn notify(&self, task: &TaskRecord, kind: UpdateKind) -> Result<(), NotifyError>;
}

/// Dry-run notifier: logs what would have been posted.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify(&self, task: &TaskRecord, kind: UpdateKind) -> Result<(), NotifyError> {
        tracing::info!(
            kind = %kind,
            id = %task.id,
            link = %task.link,
            "[dry-run] would announce task: {}",
            task.title
        );
        Ok(())
    }
}
