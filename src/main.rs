use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use energy_usage_tracker::blob_store::FileBlobStore;
use energy_usage_tracker::entry_store::{AddOutcome, DuplicateDates, EntryStore, StoreOptions};
use energy_usage_tracker::import::import_csv;
use energy_usage_tracker::report::{render_averages, render_entries};
use jiff::Zoned;
use jiff::civil::Date;
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Energy usage tracker.
/// Log periodic meter readings (date + cumulative KWH) and see how much you use per day,
/// plus a projection of your consumption over the next 12 months.
#[derive(Parser, Debug)]
#[command(version, long_about)]
struct EnergyUsageTracker {
    /// Directory holding the saved readings.
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,
    /// The date new readings default to. Defaults to the current local date.
    #[arg(long)]
    today: Option<Date>,
    /// What to do with a reading for a date that already has one.
    #[arg(long, value_enum, default_value_t = DuplicatePolicy::Keep)]
    on_duplicate: DuplicatePolicy,
    /// Refuse readings below zero.
    #[arg(long)]
    reject_negative: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Copy, Clone, PartialEq, Eq, Debug)]
enum DuplicatePolicy {
    /// Keep both readings; the interval between them counts as zero days.
    Keep,
    /// Overwrite the earlier reading for that date.
    Replace,
}

impl From<DuplicatePolicy> for DuplicateDates {
    fn from(policy: DuplicatePolicy) -> Self {
        match policy {
            DuplicatePolicy::Keep => DuplicateDates::Keep,
            DuplicatePolicy::Replace => DuplicateDates::Replace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show saved readings with the index `delete` expects.
    List,
    /// Add a reading. Missing values default to today and the latest reading.
    Add {
        date: Option<String>,
        reading: Option<String>,
    },
    /// Delete the reading at INDEX.
    Delete { index: usize },
    /// Show per-interval averages and the 12-month projection.
    Report,
    /// Add every row of a CSV file with a `date,reading` header.
    Import { csv: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let args = EnergyUsageTracker::parse();
    let today = args.today.unwrap_or_else(|| Zoned::now().date());
    let options = StoreOptions {
        duplicates: args.on_duplicate.into(),
        allow_negative_readings: !args.reject_negative,
    };
    let backend = FileBlobStore::new(&args.data_dir);
    let mut store = EntryStore::load(backend, options)
        .with_context(|| format!("Failed to load readings from {}", args.data_dir.display()))?;
    eprintln!("Found {} readings", store.entries().len());

    match args.command {
        Command::List => print!("{}", render_entries(store.entries())),
        Command::Report => {
            let averages = store.averages();
            if averages.intervals.is_empty() {
                eprintln!("Need at least two readings to calculate averages.");
            }
            print!("{}", render_averages(&averages));
        }
        Command::Add { date, reading } => {
            let draft = store.suggested_input(today);
            let date = date.unwrap_or_else(|| draft.date.to_string());
            let reading = reading.unwrap_or_else(|| draft.reading.to_string());
            match store.add(&date, &reading)? {
                AddOutcome::Added { index } => eprintln!("Added {date} {reading} at #{index}"),
                AddOutcome::Replaced { index, previous } => eprintln!(
                    "Replaced #{index} ({} KWH) with {reading}",
                    previous.reading
                ),
                AddOutcome::Rejected(reason) => eprintln!("Nothing added: {reason}"),
            }
        }
        Command::Delete { index } => match store.delete(index)? {
            Some(removed) => eprintln!("Deleted {} {}", removed.date, removed.reading),
            None => eprintln!("Nothing deleted: no reading #{index}"),
        },
        Command::Import { csv } => {
            let file =
                File::open(&csv).with_context(|| format!("Failed to open {}", csv.display()))?;
            let summary = import_csv(&mut store, file)
                .with_context(|| format!("Failed to import {}", csv.display()))?;
            eprintln!(
                "Imported {} readings, skipped {}",
                summary.added, summary.rejected
            );
        }
    }
    Ok(())
}
