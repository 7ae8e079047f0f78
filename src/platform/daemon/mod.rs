use crate::config::Config;
use crate::core::poller::Poller;
use crate::platform::schedule::{self, PollSchedule};
use crate::transport::discord::DiscordBot;
use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;

mod supervisor;

use supervisor::spawn_component_supervisor;

const INITIAL_BACKOFF_SECS: u64 = 2;
const MAX_BACKOFF_SECS: u64 = 60;
const MAX_RESTARTS: u32 = 10;

/// Run the watcher until Ctrl-C: scheduler, optional Discord gateway and the
/// startup check.
pub async fn run(
    config: Arc<Config>,
    poller: Arc<Poller>,
    bot: Option<Arc<DiscordBot>>,
) -> Result<()> {
    // Bad expressions are fatal here, before anything is spawned.
    let poll_schedule = PollSchedule::parse(&config.monitor.schedule)?;

    if let Some(bot) = &bot
        && !bot.health_check().await
    {
        anyhow::bail!("Discord bot token was rejected");
    }

    let mut handles: Vec<JoinHandle<()>> = Vec::new();

    {
        let poller = Arc::clone(&poller);
        handles.push(spawn_component_supervisor(
            "scheduler",
            INITIAL_BACKOFF_SECS,
            MAX_BACKOFF_SECS,
            MAX_RESTARTS,
            move || {
                let poller = Arc::clone(&poller);
                let poll_schedule = poll_schedule.clone();
                async move { schedule::run(poller, poll_schedule).await }
            },
        ));
    }

    if let Some(bot) = bot {
        handles.push(spawn_component_supervisor(
            "discord",
            INITIAL_BACKOFF_SECS,
            MAX_BACKOFF_SECS,
            MAX_RESTARTS,
            move || {
                let bot = Arc::clone(&bot);
                async move { bot.listen().await }
            },
        ));
    } else {
        tracing::info!("Dry run: Discord gateway disabled");
    }

    if config.monitor.run_on_startup {
        let poller = Arc::clone(&poller);
        handles.push(tokio::spawn(async move {
            poller.poll_once().await;
        }));
    }

    println!("◆ slopwatch running");
    println!("   Watching: {}", config.source.tasks_url);
    println!("   Schedule: {}", config.monitor.schedule);
    println!("   Press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");

    for handle in &handles {
        handle.abort();
    }
    for handle in handles {
        let _ = handle.await;
    }

    Ok(())
}
