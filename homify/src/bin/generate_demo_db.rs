//! Generate a demo grocery database.
//!
//! This creates a SQLite database using the native Rust database code,
//! ensuring schema compatibility with the app. Expiry dates and consumption
//! windows are spread around today so every reminder kind shows up.
//!
//! Usage:
//!     cargo run --bin generate-demo-db -- [--count 40] [output_path]

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use clap::Parser;
use homify::database::Database;
use homify::dates;
use homify::models::StoredGrocery;
use homify::{GroceryDraft, ReminderEvaluator};
use rand::Rng;
use std::path::PathBuf;

/// Sample groceries with a typical quantity and shelf life in days
const GROCERIES: &[(&str, &str, u64)] = &[
    ("Milk", "1 L", 7),
    ("Yogurt", "4 cups", 14),
    ("Cheddar", "200 g", 30),
    ("Eggs", "12", 21),
    ("Bread", "1 loaf", 5),
    ("Spinach", "1 bag", 4),
    ("Chicken breast", "500 g", 3),
    ("Butter", "250 g", 60),
    ("Orange juice", "1 L", 10),
    ("Tomatoes", "6", 7),
    ("Rice", "2 kg", 365),
    ("Coffee", "500 g", 120),
    ("Olive oil", "1 bottle", 540),
    ("Bananas", "1 bunch", 6),
];

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of items to generate
    #[arg(short, long, default_value_t = 40)]
    count: usize,

    /// Path to save the SQLite database
    #[arg(default_value = "homify-demo.sqlite")]
    output: PathBuf,
}

fn random_item(rng: &mut impl Rng, today: NaiveDate) -> Result<StoredGrocery> {
    let (name, quantity, shelf_life) = GROCERIES[rng.gen_range(0..GROCERIES.len())];

    let added_days_ago = rng.gen_range(0..=shelf_life.min(14));
    let added = today
        .checked_sub_days(Days::new(added_days_ago))
        .context("Date underflow")?;

    let mut draft = GroceryDraft::new(name, quantity).with_reminder(rng.gen_bool(0.9));

    if rng.gen_bool(0.8) {
        let expiry = added
            .checked_add_days(Days::new(shelf_life))
            .context("Date overflow")?;
        draft = draft.with_expiry(dates::format_date(expiry));
    } else if rng.gen_bool(0.1) {
        // Legacy free-text entries the UI still has to show
        draft = draft.with_expiry("end of month");
    }

    if rng.gen_bool(0.5) {
        let expected = added_days_ago as i64 + rng.gen_range(-1..=2);
        draft = draft.with_expected_days(expected.max(0));
    }

    let added_ms = dates::midnight_millis_utc(added) + rng.gen_range(8..20) * 60 * 60 * 1000;
    Ok(StoredGrocery::from_draft_at(draft, added_ms)?)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.output.exists() {
        std::fs::remove_file(&args.output)
            .with_context(|| format!("Failed to remove {}", args.output.display()))?;
    }

    println!("Generating demo grocery database...");
    println!("Output: {}", args.output.display());

    let db = Database::open(&args.output).context("Failed to create database")?;
    let evaluator = ReminderEvaluator::local();
    let today = evaluator.today();
    let mut rng = rand::thread_rng();

    for _ in 0..args.count {
        let item = random_item(&mut rng, today)?;
        db.insert_grocery(&item).context("Failed to insert item")?;
    }

    let records: Vec<_> = db
        .fetch_all_groceries()?
        .into_iter()
        .map(StoredGrocery::into_record)
        .collect();
    let events = evaluator.evaluate(&records, today);

    println!();
    println!("Database created: {}", args.output.display());
    println!("  Items: {}", records.len());
    println!("  Reminders due today: {}", events.len());
    Ok(())
}
