//! Homify command line shell
//!
//! Manages the grocery record store and runs the reminder job, either once or
//! on the configured daily schedule. Notifications are printed to stdout.
//!
//! Usage:
//!     homify add --name Milk --quantity "1 L" --expiry 21/10/2026
//!     homify list [--json]
//!     homify remind [--today dd/mm/yyyy] [--json] [--daily]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use homify::config::{AppConfig, NotificationChannelConfig};
use homify::dates;
use homify::models::{display_expiry, ConsumptionStatus};
use homify::{
    GroceryDraft, GroceryRecord, GroceryStore, GroceryStoreApi, NotificationEvent, Notifier,
    ReminderEvaluator,
};
use log::{info, warn};
use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database path, overrides storage.database_path from the config
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a grocery item
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        quantity: String,
        /// Expiry date as dd/mm/yyyy
        #[arg(long)]
        expiry: Option<String>,
        /// Days the item is expected to last
        #[arg(long)]
        expected_days: Option<i64>,
        #[arg(long)]
        no_reminder: bool,
    },
    /// Edit an existing item; omitted fields keep their value
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        quantity: Option<String>,
        #[arg(long, conflicts_with = "clear_expiry")]
        expiry: Option<String>,
        #[arg(long)]
        clear_expiry: bool,
        #[arg(long, conflicts_with = "clear_expected_days")]
        expected_days: Option<i64>,
        #[arg(long)]
        clear_expected_days: bool,
        #[arg(long)]
        reminder: Option<bool>,
    },
    /// Delete an item
    Delete { id: i64 },
    /// List items, soonest expiry first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Run the reminder check
    Remind {
        /// Evaluate as if today were this dd/mm/yyyy date
        #[arg(long, conflicts_with = "daily")]
        today: Option<String>,
        #[arg(long)]
        json: bool,
        /// Keep running and check on the configured interval until Ctrl-C
        #[arg(long)]
        daily: bool,
    },
    /// Write the default configuration file
    InitConfig {
        #[arg(long)]
        force: bool,
    },
}

/// Prints each reminder the way the platform shell would post it on the
/// configured channel
struct StdoutNotifier {
    channel: NotificationChannelConfig,
}

impl Notifier for StdoutNotifier {
    fn notify(&self, title: String, body: String) {
        println!("{}", self.channel.render(&title, &body));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| AppConfig::path(Path::new(".")));

    let database = cli.database.as_deref();

    match cli.command {
        Command::InitConfig { force } => init_config(&config_path, force)?,
        Command::Add {
            name,
            quantity,
            expiry,
            expected_days,
            no_reminder,
        } => {
            let draft = GroceryDraft {
                name,
                quantity,
                expiry_date: expiry,
                expected_duration_days: expected_days,
                reminder_enabled: !no_reminder,
            };
            let (_, store) = open_store(&config_path, database)?;
            let id = store.insert(draft)?;
            println!("Added item {}", id);
        }
        Command::Edit {
            id,
            name,
            quantity,
            expiry,
            clear_expiry,
            expected_days,
            clear_expected_days,
            reminder,
        } => {
            let (_, store) = open_store(&config_path, database)?;
            let Some(record) = store.get(id)? else {
                bail!("No grocery item with id {}", id);
            };
            let mut draft = record.to_draft();
            if let Some(name) = name {
                draft.name = name;
            }
            if let Some(quantity) = quantity {
                draft.quantity = quantity;
            }
            if clear_expiry {
                draft.expiry_date = None;
            } else if expiry.is_some() {
                draft.expiry_date = expiry;
            }
            if clear_expected_days {
                draft.expected_duration_days = None;
            } else if expected_days.is_some() {
                draft.expected_duration_days = expected_days;
            }
            if let Some(enabled) = reminder {
                draft.reminder_enabled = enabled;
            }
            store.update(id, draft)?;
            println!("Updated item {}", id);
        }
        Command::Delete { id } => {
            let (_, store) = open_store(&config_path, database)?;
            store.delete(id)?;
            println!("Deleted item {}", id);
        }
        Command::List { json } => {
            let (_, store) = open_store(&config_path, database)?;
            let records = store.get_all()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_records(&records);
            }
        }
        Command::Remind { today, json, daily } => {
            let (config, store) = open_store(&config_path, database)?;
            if daily {
                run_daily(store, &config, tokio::signal::ctrl_c()).await?;
            } else if json {
                let events = store.evaluate_reminders(today)?;
                println!("{}", serde_json::to_string_pretty(&events)?);
            } else {
                let today = match today {
                    Some(raw) => dates::parse_date(raw.trim())
                        .date()
                        .with_context(|| format!("--today must be dd/mm/yyyy, got {:?}", raw))?,
                    None => ReminderEvaluator::local().today(),
                };
                let notifier = Arc::new(StdoutNotifier {
                    channel: config.notifications.clone(),
                });
                let events = store.check_reminders_on(notifier, today).await?;
                if events.is_empty() {
                    println!("Nothing to remind about on {}", dates::format_date(today));
                }
            }
        }
    }

    Ok(())
}

/// Load the config, report problems in it, and open the database it points
/// at (or `database` when given)
fn open_store(config_path: &Path, database: Option<&Path>) -> Result<(AppConfig, GroceryStore)> {
    let config = AppConfig::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    for problem in config.validate() {
        warn!("Config: {}", problem);
    }

    let db_path = database
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.storage.database_path));
    let store = GroceryStore::new(db_path.to_string_lossy().into_owned())
        .with_context(|| format!("Failed to open {}", db_path.display()))?;
    Ok((config, store))
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    AppConfig::default()
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn print_records(records: &[GroceryRecord]) {
    if records.is_empty() {
        println!("No groceries yet");
        return;
    }

    let evaluator = ReminderEvaluator::local();
    let today = evaluator.today();
    let tz = chrono::Local;

    for record in records {
        let mut line = format!("#{:<4} {} ({})", record.id, record.name, record.quantity);
        if let Some(raw) = &record.expiry_date {
            line.push_str(&format!("  {}", display_expiry(raw)));
        }
        if let Some(status) = ConsumptionStatus::for_record(record, today, &tz) {
            line.push_str(&format!("  {}", status.label()));
        }
        if !record.reminder_enabled {
            line.push_str("  [reminders off]");
        }
        println!("{}", line);
    }
}

/// Check on every tick of the configured interval. The first tick fires
/// immediately. A reminder already sent for the same item, kind and day is
/// not sent again.
async fn run_daily<F>(store: GroceryStore, config: &AppConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    let notifier: Arc<dyn Notifier> = Arc::new(StdoutNotifier {
        channel: config.notifications.clone(),
    });
    let evaluator = ReminderEvaluator::local();
    let mut sent: HashSet<String> = HashSet::new();
    let mut interval = tokio::time::interval(config.reminders.interval());

    // Single listener for the whole loop
    tokio::pin!(shutdown);

    info!(
        "Scheduled {} every {}h on channel {}, press Ctrl-C to stop",
        config.reminders.job_name, config.reminders.interval_hours, config.notifications.channel_id
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let today = evaluator.today();
                let today_prefix = format!("{}|", dates::format_date(today));
                sent.retain(|key| key.starts_with(&today_prefix));

                let events = store.pending_reminders(today).await?;
                let fresh: Vec<NotificationEvent> = events
                    .into_iter()
                    .filter(|event| sent.insert(event.dedupe_key(today)))
                    .collect();

                for event in &fresh {
                    notifier.notify(event.title.clone(), event.body.clone());
                }
                info!("{}: {} new notification(s)", config.reminders.job_name, fresh.len());
            }
            result = &mut shutdown => {
                result.context("Failed to listen for shutdown")?;
                info!("Stopping {}", config.reminders.job_name);
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn temp_store(dir: &TempDir) -> GroceryStore {
        let path = dir.path().join("homify.sqlite").to_string_lossy().to_string();
        GroceryStore::new(path).unwrap()
    }

    #[test]
    fn test_init_config_writes_defaults_once() {
        let dir = TempDir::new().unwrap();
        let path = AppConfig::path(dir.path());

        init_config(&path, false).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), AppConfig::default());

        assert!(init_config(&path, false).is_err());
        init_config(&path, true).unwrap();
    }

    #[test]
    fn test_open_store_prefers_database_override() {
        let dir = TempDir::new().unwrap();
        let config_path = AppConfig::path(dir.path());
        let db_path = dir.path().join("override.sqlite");

        let (config, store) = open_store(&config_path, Some(&db_path)).unwrap();
        store.insert(GroceryDraft::new("Milk", "1 L")).unwrap();

        assert_eq!(config, AppConfig::default());
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_daily_loop_stops_on_shutdown() {
        let dir = TempDir::new().unwrap();
        let store = temp_store(&dir);
        let today = ReminderEvaluator::local().today();
        store
            .insert(GroceryDraft::new("Milk", "1 L").with_expiry(dates::format_date(today)))
            .unwrap();

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            run_daily(store, &AppConfig::default(), async { Ok::<(), std::io::Error>(()) }),
        )
        .await;

        assert!(matches!(result, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_daily_loop_reports_listener_failure() {
        let dir = TempDir::new().unwrap();
        let shutdown = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Err::<(), _>(std::io::Error::new(std::io::ErrorKind::Other, "no signal handler"))
        };

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            run_daily(temp_store(&dir), &AppConfig::default(), shutdown),
        )
        .await;

        assert!(matches!(result, Ok(Err(_))));
    }
}
