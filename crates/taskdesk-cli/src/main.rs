//! `taskdesk` CLI — leave-aware date checks, task search and theme settings.
//!
//! ## Usage
//!
//! ```sh
//! # Is a day selectable for the assignee whose approved leave is in leave.json?
//! taskdesk check --leaves leave.json --date 2024-06-11
//!
//! # Same, reading leave from stdin and pinning "today"
//! cat leave.json | taskdesk check --date 2024-06-11 --today 2024-06-01
//!
//! # List every leave day between two dates
//! taskdesk blocked --leaves leave.json --from 2024-06-01 --to 2024-06-30
//!
//! # One line per day of a month with its status
//! taskdesk month --leaves leave.json --month 2024-06
//!
//! # Search a task listing
//! taskdesk tasks -i tasks.json --query report
//!
//! # Theme settings (stored under $TASKDESK_STORE, default .taskdesk)
//! taskdesk theme show
//! taskdesk theme set dark
//! taskdesk theme toggle
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (default `warn`).

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::{Args, Parser, Subcommand};
use taskdesk::task::parse_tasks;
use taskdesk::{
    filter_tasks, parse_intervals, Clock, FileStorage, FixedClock, IntervalSet,
    LeaveConflictCalculator, LocalClock, Theme, ThemeStore, ZonedClock,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "taskdesk",
    version,
    about = "Leave-aware task scheduling tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a single date is blocked for scheduling
    Check {
        /// Approved-leave JSON file (reads from stdin if omitted or "-")
        #[arg(short, long)]
        leaves: Option<String>,
        /// Candidate date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,
        #[command(flatten)]
        today: TodayArgs,
    },
    /// List leave days, optionally within a date range
    Blocked {
        /// Approved-leave JSON file (reads from stdin if omitted or "-")
        #[arg(short, long)]
        leaves: Option<String>,
        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Show the status of every day in a month
    Month {
        /// Approved-leave JSON file (reads from stdin if omitted or "-")
        #[arg(short, long)]
        leaves: Option<String>,
        /// Month to show (YYYY-MM)
        #[arg(short, long)]
        month: String,
        #[command(flatten)]
        today: TodayArgs,
    },
    /// Filter a task listing by name, description or priority
    Tasks {
        /// Task listing JSON file (reads from stdin if omitted or "-")
        #[arg(short, long)]
        input: Option<String>,
        /// Case-insensitive search text
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// Show or change the persisted theme
    Theme {
        /// Directory holding persisted settings
        #[arg(long, env = "TASKDESK_STORE", default_value = ".taskdesk")]
        store: PathBuf,
        #[command(subcommand)]
        action: ThemeAction,
    },
}

#[derive(Subcommand)]
enum ThemeAction {
    /// Print the current theme
    Show,
    /// Set the theme
    Set {
        /// light or dark
        theme: Theme,
    },
    /// Switch between light and dark
    Toggle,
}

/// How "today" is determined for the past-date rule.
#[derive(Args)]
struct TodayArgs {
    /// Evaluate as if today were this date (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,
    /// IANA timezone whose calendar day counts as today (ignored with --today)
    #[arg(long, env = "TASKDESK_TIMEZONE")]
    timezone: Option<String>,
}

impl TodayArgs {
    fn resolve(&self) -> Result<NaiveDate> {
        if let Some(day) = self.today {
            return Ok(day);
        }
        match self.timezone.as_deref() {
            Some(name) => Ok(ZonedClock::from_name(name)?.today()),
            None => Ok(LocalClock.today()),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            leaves,
            date,
            today,
        } => {
            let set = read_leave(leaves.as_deref())?;
            let calc =
                LeaveConflictCalculator::with_clock(&set.intervals, FixedClock(today.resolve()?));
            let verdict = if calc.is_blocked(date) {
                "blocked"
            } else {
                "available"
            };
            println!("{verdict}");
        }
        Commands::Blocked { leaves, from, to } => {
            let set = read_leave(leaves.as_deref())?;
            let calc = LeaveConflictCalculator::with_clock(&set.intervals, LocalClock);
            let from = from.unwrap_or(NaiveDate::MIN);
            let to = to.unwrap_or(NaiveDate::MAX);
            for day in calc.leave_days_between(from, to) {
                println!("{day}");
            }
        }
        Commands::Month {
            leaves,
            month,
            today,
        } => {
            let first = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
                .with_context(|| format!("Invalid month '{month}', expected YYYY-MM"))?;
            let set = read_leave(leaves.as_deref())?;
            let calc =
                LeaveConflictCalculator::with_clock(&set.intervals, FixedClock(today.resolve()?));
            let view = calc
                .month_view(first.year(), first.month())
                .with_context(|| format!("Invalid month '{month}'"))?;
            for (day, status) in view {
                println!("{day} {status}");
            }
        }
        Commands::Tasks { input, query } => {
            let json = read_input(input.as_deref())?;
            let tasks = parse_tasks(&json).context("Failed to parse task listing")?;
            let matches = filter_tasks(&tasks, &query);
            println!("{}", serde_json::to_string_pretty(&matches)?);
        }
        Commands::Theme { store, action } => {
            let themes = ThemeStore::hydrate(FileStorage::new(&store))
                .with_context(|| format!("Failed to read theme from {}", store.display()))?;
            let theme = match action {
                ThemeAction::Show => themes.theme(),
                ThemeAction::Set { theme } => {
                    themes
                        .set_theme(theme)
                        .with_context(|| format!("Failed to save theme to {}", store.display()))?;
                    theme
                }
                ThemeAction::Toggle => themes
                    .toggle()
                    .with_context(|| format!("Failed to save theme to {}", store.display()))?,
            };
            println!("{theme}");
        }
    }

    Ok(())
}

/// Read and parse an approved-leave listing. Malformed entries are logged
/// and skipped.
fn read_leave(path: Option<&str>) -> Result<IntervalSet> {
    let json = read_input(path)?;
    let set = parse_intervals(&json).context("Failed to parse approved leave")?;
    if !set.rejected.is_empty() {
        tracing::info!(
            kept = set.intervals.len(),
            skipped = set.rejected.len(),
            "approved leave loaded"
        );
    }
    Ok(set)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) if path != "-" => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
