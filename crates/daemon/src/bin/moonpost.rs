//! moonpost: posts new/full moon notices to a Telegram chat once a day.
//!
//! Subcommands:
//! - `run` (default): load the remote config and post on the configured interval
//! - `phase`: print the phase message for now or a given instant
//! - `calendar`: print upcoming new and full moons

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tokio::sync::Notify;
use tracing::info;

use moonpost_core::calendar::lunar_calendar;
use moonpost_core::config::load_dotenv;
use moonpost_core::{PhaseCalculator, SystemClock};
use moonpost_daemon::runner::{self, shutdown_signal};
use moonpost_daemon::{PostScheduler, Reporter};
use moonpost_notify::TelegramNotifier;
use moonpost_store::{ConfigStore, YssStore};

// ── CLI ─────────────────────────────────────────────────────────────

/// Moon phase poster. Posts new and full moon notices once per UTC day.
#[derive(Parser, Debug)]
#[command(name = "moonpost", version, about)]
struct Cli {
    /// URL of the YAML config document (GET to load, PUT to save).
    #[arg(long, env = "YssUrl", global = true)]
    yss_url: Option<String>,

    /// Timeout for each HTTP request, in seconds.
    #[arg(long, env = "MOONPOST_HTTP_TIMEOUT", default_value_t = 30, global = true)]
    http_timeout: u64,

    /// Reload the config document before each daily check.
    #[arg(long, env = "MOONPOST_REFETCH", global = true)]
    refetch: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Post on the configured interval until SIGINT/SIGTERM.
    Run,
    /// Print the phase message.
    Phase {
        /// Instant to classify (RFC 3339); defaults to now.
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Print new and full moons starting at the most recent new moon.
    Calendar {
        /// How many weeks to cover.
        #[arg(long, default_value_t = 54)]
        weeks: u32,
    },
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        None | Some(Command::Run) => run(&cli).await,
        Some(Command::Phase { at }) => {
            let now = at.unwrap_or_else(Utc::now);
            match PhaseCalculator::default().message(now) {
                Some(message) => println!("{message}"),
                None => println!("No new or full moon within a day of {now}."),
            }
            Ok(())
        }
        Some(Command::Calendar { weeks }) => {
            println!("{}", lunar_calendar(&PhaseCalculator::default(), Utc::now(), weeks));
            Ok(())
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let yss_url = cli
        .yss_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .context("YssUrl empty")?;
    let timeout = Duration::from_secs(cli.http_timeout);

    let store = Arc::new(YssStore::new(yss_url, timeout)?);
    let config = store.fetch().await.context("failed to load config")?;
    config.validate().context("invalid config")?;
    config.log_summary();

    let notifier = Arc::new(
        TelegramNotifier::from_config(
            &config.tg_api_url_base,
            config.tg_token.clone(),
            config.tg_chat_id.clone(),
            timeout,
        )
        .context("failed to create Telegram notifier")?,
    );
    let reporter = Reporter::new(notifier.clone());

    let shutdown = Arc::new(Notify::new());
    {
        let shutdown = shutdown.clone();
        let reporter = reporter.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            info!("shutdown signal received");
            reporter.report("moonpost sigterm").await;
            shutdown.notify_one();
        });
    }

    let scheduler = PostScheduler::new(config, Arc::new(SystemClock), notifier, store)
        .with_refetch(cli.refetch);

    info!(refetch = cli.refetch, "moonpost starting");
    runner::run(scheduler, Some(reporter), shutdown).await;
    info!("moonpost exited cleanly");

    Ok(())
}
