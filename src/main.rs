//! # Huddle — shared-workspace reminder engine (maintenance CLI)
//!
//! Inspect and exercise a schedule database from the shell. The chat
//! transport consumes the same library; this binary is for operators.
//!
//! Usage:
//!   huddle add --owner 42 --member Ana "6/21/25" "8:00 PM" once "Team sync"
//!   huddle due --viewer 42 today
//!   huddle show --viewer 42
//!   huddle delete --owner 42 7

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use huddle_core::HuddleConfig;
use huddle_sched::{ScheduleDraft, ScheduleEngine, SqliteStore, Window, parse, view};

#[derive(Parser)]
#[command(name = "huddle", version, about = "Shared-workspace reminder engine")]
struct Cli {
    /// Database path (defaults to the configured store)
    #[arg(long)]
    db: Option<std::path::PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a reminder
    Add {
        /// Owner identity (chat id)
        #[arg(long)]
        owner: i64,
        /// Creator display name
        #[arg(long, default_value = "")]
        member: String,
        /// Project label
        #[arg(long, default_value = "")]
        project: String,
        /// Additional viewer ids (repeatable, up to 5)
        #[arg(long = "share")]
        share: Vec<i64>,
        /// Anchor date, e.g. "6/21/25" or "Jun 21 25"
        date: String,
        /// Time of day, e.g. "8:00 PM" or "9am"
        time: String,
        /// Once/Daily/Weekly/Monthly/Yearly (prefixes accepted)
        recurrence: String,
        /// Reminder text
        message: String,
    },
    /// Delete a reminder by its local id
    Delete {
        #[arg(long)]
        owner: i64,
        id: u16,
    },
    /// List everything a viewer can see, regardless of date
    Show {
        #[arg(long)]
        viewer: i64,
    },
    /// Report due reminders for a window
    Due {
        #[arg(long)]
        viewer: i64,
        /// today | tomorrow | thisweek
        window: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "huddle=debug,huddle_sched=debug,huddle_core=debug"
    } else {
        "huddle=info,huddle_sched=info,huddle_core=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = HuddleConfig::load()?;
    let db_path = cli.db.clone().unwrap_or_else(|| config.store_path.clone());
    let store = Arc::new(SqliteStore::open(&db_path)?);
    let engine = ScheduleEngine::new(store, config);

    match cli.command {
        Command::Add {
            owner,
            member,
            project,
            share,
            date,
            time,
            recurrence,
            message,
        } => {
            let today = engine.local_now().date();
            let draft = ScheduleDraft {
                owner_id: owner,
                member,
                anchor_date: parse::parse_date(&date, today)?,
                time_of_day: parse::parse_time(&time)?,
                recurrence: parse::parse_recurrence(&recurrence)?,
                message,
                project,
                extended_access: share,
            };
            let schedule = engine.create(draft).await?;
            println!(
                "✅ Saved #{}: {} {} at {} — {}",
                schedule.local_id,
                schedule.recurrence,
                huddle_sched::model::format_date(schedule.anchor_date),
                schedule.time_of_day,
                schedule.message
            );
        }
        Command::Delete { owner, id } => {
            if engine.delete(owner, id).await? {
                println!("🗑️  Deleted #{id}");
            } else {
                println!("No schedule #{id} for owner {owner}");
            }
        }
        Command::Show { viewer } => {
            let schedules = engine.list_all(viewer).await?;
            print!("{}", view::list_text(&schedules));
        }
        Command::Due { viewer, window } => {
            let window = Window::parse(&window)
                .ok_or_else(|| anyhow::anyhow!("unknown window (today/tomorrow/thisweek)"))?;
            let report = engine.query(viewer, window).await?;
            print!("{}", view::render_text(&report));
        }
    }

    Ok(())
}
