use crate::cli::{Cli, Commands};
use crate::commands::list_tasks;
use crate::config::Config;
use crate::core::poller::PollOutcome;
use crate::core::source::ListingSource;
use crate::transport::discord::DiscordBot;
use anyhow::Result;
use std::sync::Arc;

use super::wiring::{build_discord_http, build_fetcher, build_notifier, build_poller};

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Run => run_daemon(config).await,
        Commands::Poll => poll_once(&config).await,
        Commands::List { limit } => list(&config, limit).await,
        Commands::Check => crate::diagnostics::check::run(&config).await,
    }
}

async fn run_daemon(config: Config) -> Result<()> {
    config.require_discord()?;
    let config = Arc::new(config);

    let source: Arc<dyn ListingSource> = Arc::new(build_fetcher(&config)?);
    let http = build_discord_http(&config);
    let notifier = build_notifier(&config, http.as_ref());
    let poller = Arc::new(build_poller(&config, source, notifier).await);

    let bot = http.map(|http| {
        Arc::new(DiscordBot::new(
            config.discord.clone(),
            http,
            Arc::clone(&poller),
        ))
    });

    crate::platform::daemon::run(config, poller, bot).await
}

async fn poll_once(config: &Config) -> Result<()> {
    config.require_discord()?;

    let source: Arc<dyn ListingSource> = Arc::new(build_fetcher(config)?);
    let http = build_discord_http(config);
    let notifier = build_notifier(config, http.as_ref());
    let poller = build_poller(config, source, notifier).await;

    match poller.poll_once().await {
        PollOutcome::Completed(report) => {
            println!(
                "Fetched {} listing(s): {} new, {} filtered, {} posted, {} failed",
                report.fetched, report.new, report.filtered, report.notified, report.failed
            );
        }
        PollOutcome::Busy => println!("A check is already running."),
    }
    Ok(())
}

async fn list(config: &Config, limit: Option<i64>) -> Result<()> {
    let fetcher = build_fetcher(config)?;
    let tasks = list_tasks(&fetcher, limit).await;

    if tasks.is_empty() {
        println!("No tasks found right now.");
        return Ok(());
    }

    println!("Latest {} task(s):", tasks.len());
    for task in tasks {
        let category = task
            .category
            .as_deref()
            .map_or_else(String::new, |c| format!(" [{c}]"));
        println!("- {}{category}\n    {}", task.title, task.link);
    }
    Ok(())
}
