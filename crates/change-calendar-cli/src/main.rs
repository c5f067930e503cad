use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use change_calendar::{
    classify, render_overlaps, resolve_period, scheduled_changes, ChangeSource, Config,
    ConflictChecker, Intent, ServiceNowClient,
};

#[derive(Parser)]
#[command(
    name = "chgcal",
    version,
    about = "Resolve change periods and check proposed dates against freeze windows"
)]
struct Cli {
    /// TOML config file (environment variables override its values)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Pin "now" instead of reading the clock (YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_now)]
    now: Option<NaiveDateTime>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a time-period phrase and print the range as JSON
    Period {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Check the date in a request against freeze windows and risky changes
    Conflict {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// List scheduled or completed changes for the period named in the text
    Changes {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Emit CSV instead of a Markdown table
        #[arg(long)]
        csv: bool,
    },
    /// List open changes whose window overlaps the given change's window
    Overlaps {
        /// Change number to leave out of the results
        number: String,

        /// Window start (YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD)
        #[arg(long, value_parser = parse_now)]
        start: NaiveDateTime,

        /// Window end (YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD)
        #[arg(long, value_parser = parse_now)]
        end: NaiveDateTime,
    },
    /// Route a free-form question to the matching command
    Ask {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}

const OUT_OF_SCOPE: &str = "I can check a proposed date against freeze windows or list scheduled \
changes. Try 'Can I schedule the upgrade on 2026-12-15?' or 'Show me upcoming changes'.";

fn parse_now(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .map_err(|e| format!("expected YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD: {e}"))
}

fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("change_calendar={level},chgcal={level}"))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn remote_source(config: &Config) -> Option<ServiceNowClient> {
    if !config.servicenow.is_configured() {
        return None;
    }
    match ServiceNowClient::new(&config.servicenow) {
        Ok(client) => Some(client),
        Err(e) => {
            tracing::warn!(error = %e, "ServiceNow client unavailable, using demo data");
            None
        }
    }
}

fn run_conflict(config: &Config, text: &str, now: NaiveDateTime) -> String {
    ConflictChecker::new(config).check(text, now.date()).render()
}

fn run_changes(config: &Config, text: &str, now: NaiveDateTime, csv: bool) -> Result<String> {
    let remote = remote_source(config);
    let listing = scheduled_changes(text, now, remote.as_ref().map(|c| c as &dyn ChangeSource));
    if csv {
        listing.to_csv().context("failed to export changes as CSV")
    } else {
        Ok(listing.render())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    let now = match cli.now {
        Some(now) => now,
        None => config.now().context("failed to read the current time")?,
    };
    tracing::debug!(%now, timezone = %config.timezone, "anchored");

    let output = match cli.command {
        Commands::Period { text } => {
            let range = resolve_period(&text.join(" "), now);
            serde_json::to_string_pretty(&range).context("failed to serialize time range")?
        }
        Commands::Conflict { text } => run_conflict(&config, &text.join(" "), now),
        Commands::Changes { text, csv } => run_changes(&config, &text.join(" "), now, csv)?,
        Commands::Overlaps { number, start, end } => {
            anyhow::ensure!(start <= end, "window start {start} is after its end {end}");
            let overlaps = ConflictChecker::new(&config).overlapping_changes(&number, start, end);
            render_overlaps(&number, &overlaps)
        }
        Commands::Ask { text } => {
            let question = text.join(" ");
            match classify(&question) {
                Intent::ScheduleConflict => run_conflict(&config, &question, now),
                Intent::ScheduledChanges => run_changes(&config, &question, now, false)?,
                Intent::Unrouted => OUT_OF_SCOPE.to_string(),
            }
        }
    };

    println!("{}", output.trim_end());
    Ok(())
}
