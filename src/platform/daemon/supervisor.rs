use anyhow::Result;
use std::future::Future;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// Keep a long-running component alive.
///
/// A clean exit (e.g. a gateway reconnect request) restarts immediately after
/// the initial backoff; errors back off exponentially up to `max_backoff_secs`.
/// `max_restarts == 0` disables the circuit breaker.
pub(super) fn spawn_component_supervisor<F, Fut>(
    name: &'static str,
    initial_backoff_secs: u64,
    max_backoff_secs: u64,
    max_restarts: u32,
    mut run_component: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        let initial_backoff = initial_backoff_secs.max(1);
        let max_backoff = max_backoff_secs.max(initial_backoff);
        let mut backoff = initial_backoff;
        let mut consecutive_failures: u32 = 0;

        loop {
            tracing::info!("Daemon component '{name}' starting");
            match run_component().await {
                Ok(()) => {
                    tracing::info!("Daemon component '{name}' exited; restarting");
                    backoff = initial_backoff;
                    consecutive_failures = 0;
                }
                Err(e) => {
                    tracing::error!("Daemon component '{name}' failed: {e:#}");
                    consecutive_failures = consecutive_failures.saturating_add(1);
                }
            }

            if max_restarts > 0 && consecutive_failures > max_restarts {
                tracing::error!(
                    "Daemon component '{name}' exceeded max restarts ({max_restarts}), circuit open"
                );
                break;
            }
            tokio::time::sleep(Duration::from_secs(backoff)).await;
            if consecutive_failures > 0 {
                backoff = backoff.saturating_mul(2).min(max_backoff);
            }
        }
    })
}
