mod expression;

pub use expression::PollSchedule;

use crate::core::poller::Poller;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tokio::time::Duration;

/// Trigger a poll cycle at every schedule tick. Runs until aborted.
pub async fn run(poller: Arc<Poller>, schedule: PollSchedule) -> Result<()> {
    tracing::info!(schedule = schedule.expression(), "Scheduler started");

    loop {
        let now = Utc::now();
        let Some(next) = schedule.next_after(now) else {
            anyhow::bail!(
                "No future occurrence for expression: {}",
                schedule.expression()
            );
        };
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        tracing::debug!(next = %next.to_rfc3339(), "Next scheduled check");
        tokio::time::sleep(wait).await;

        poller.poll_once().await;
    }
}
