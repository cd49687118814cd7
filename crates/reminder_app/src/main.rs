use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reminder_app::{
    cli::{describe_outcome, read_task},
    config::AppConfig,
    console::ConsoleAlert,
    store::FileNotificationService,
};
use reminder_core::{
    notifications::{NotificationHandle, Trigger},
    NotificationScheduler, QuickAdd,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "task_reminders", version, about = "Task reminder scheduling")]
struct Cli {
    /// Notification store file (overrides TASK_REMINDERS_STORE)
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule a reminder for a task described by a JSON file
    Schedule {
        /// Path to the task JSON (`-` reads stdin)
        task: PathBuf,
        /// Remind daily at the due time instead of once
        #[arg(long)]
        recurring: bool,
    },
    /// Schedule a reminder straight from a title, date and time
    QuickAdd {
        #[arg(long)]
        title: String,
        /// YYYY-MM-DD, YYYY/MM/DD or DD/MM/YYYY
        #[arg(long)]
        date: String,
        /// HH:MM, 24-hour
        #[arg(long)]
        time: String,
    },
    /// Cancel one scheduled reminder
    Cancel { handle: Option<String> },
    /// Cancel every scheduled reminder
    CancelAll,
    /// List scheduled reminders
    List,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::from_env().unwrap_or_default();
    if let Some(store) = cli.store {
        config.store_path = store;
    }
    let service = FileNotificationService::open(&config.store_path)
        .context("failed to open notification store")?;
    tracing::debug!(store = %service.path().display(), "notification store ready");
    let scheduler = NotificationScheduler::builder(Box::new(service))
        .with_alert_sink(Box::new(ConsoleAlert))
        .with_config(config.scheduler.clone())
        .build();

    match cli.command {
        Commands::Schedule { task, recurring } => {
            let task = read_task(&task, std::io::stdin())?;
            let outcome = if recurring {
                scheduler.schedule_recurring_daily(&task).await
            } else {
                scheduler.schedule_one_time(&task).await
            };
            println!("{}", describe_outcome(&outcome));
        }
        Commands::QuickAdd { title, date, time } => {
            scheduler
                .quick_add_and_notify(&QuickAdd {
                    title,
                    due_date: date,
                    due_time: time,
                })
                .await;
        }
        Commands::Cancel { handle } => {
            let handle = handle.map(NotificationHandle::from);
            let cancelled = scheduler.cancel(handle.as_ref()).await;
            println!("{}", if cancelled { "cancelled" } else { "not cancelled" });
        }
        Commands::CancelAll => {
            let cancelled = scheduler.cancel_all().await;
            println!("{}", if cancelled { "cancelled" } else { "not cancelled" });
        }
        Commands::List => {
            for entry in scheduler.list_scheduled().await {
                let when = match entry.request.trigger {
                    Trigger::At { instant } => instant.format("%Y-%m-%d %H:%M").to_string(),
                    Trigger::Daily { hour, minute } => format!("daily {hour:02}:{minute:02}"),
                };
                println!("{}\t{}\t{}", entry.handle, when, entry.request.content.title);
            }
        }
    }
    Ok(())
}
