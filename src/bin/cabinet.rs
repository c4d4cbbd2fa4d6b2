//! FileCabinet CLI
//!
//! Runs one command against the configured record store.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::{fmt, EnvFilter};

use filecabinet::config::{StorageKind, ValidationRules};
use filecabinet::{open_store, Config, Record, RecordFields, RecordStore, Result, Snapshot};

/// FileCabinet CLI
#[derive(Parser, Debug)]
#[command(name = "cabinet")]
#[command(about = "Person record cabinet backed by memory or a binary data file")]
#[command(version)]
struct Args {
    /// Storage backend: memory or file
    #[arg(short, long, default_value = "file", value_parser = parse_storage)]
    storage: StorageKind,

    /// Data file for the file backend
    #[arg(short, long, default_value = "cabinet-records.db")]
    file: PathBuf,

    /// Validation rule set: default or custom
    #[arg(long, default_value = "default", value_parser = parse_rules)]
    validation_rules: ValidationRules,

    /// Log how long each store call takes
    #[arg(long)]
    use_stopwatch: bool,

    /// Log every store call with its arguments
    #[arg(long)]
    use_logger: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new record
    Create(FieldArgs),

    /// Replace every field of a record
    Update {
        /// Record id
        id: i32,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Delete a record
    Delete {
        /// Record id
        id: i32,
    },

    /// Reclaim space held by deleted records
    Purge,

    /// Print the number of records
    Stat,

    /// Print every record
    List,

    /// Find records by one field
    Find {
        #[command(subcommand)]
        by: FindBy,
    },

    /// Write all records to a snapshot file
    Export {
        /// Snapshot file path
        path: PathBuf,
    },

    /// Replace all records with a snapshot file's contents
    Import {
        /// Snapshot file path
        path: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum FindBy {
    FirstName { name: String },
    LastName { name: String },
    DateOfBirth { date: NaiveDate },
}

#[derive(clap::Args, Debug)]
struct FieldArgs {
    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    /// YYYY-MM-DD
    #[arg(long)]
    date_of_birth: NaiveDate,

    #[arg(long)]
    working_hours: i16,

    #[arg(long)]
    annual_income: Decimal,

    #[arg(long)]
    license_category: char,
}

impl From<FieldArgs> for RecordFields {
    fn from(args: FieldArgs) -> Self {
        RecordFields {
            first_name: args.first_name,
            last_name: args.last_name,
            date_of_birth: args.date_of_birth,
            working_hours_per_week: args.working_hours,
            annual_income: args.annual_income,
            driver_license_category: args.license_category,
        }
    }
}

fn parse_storage(s: &str) -> std::result::Result<StorageKind, String> {
    s.parse().map_err(|e: filecabinet::CabinetError| e.to_string())
}

fn parse_rules(s: &str) -> std::result::Result<ValidationRules, String> {
    s.parse().map_err(|e: filecabinet::CabinetError| e.to_string())
}

fn main() {
    // Logs go to stderr so command output stays clean
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,filecabinet=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .storage(args.storage)
        .data_file(&args.file)
        .validation_rules(args.validation_rules)
        .use_stopwatch(args.use_stopwatch)
        .use_logger(args.use_logger)
        .build();

    let mut store = match open_store(&config) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(store.as_mut(), args.command) {
        eprintln!("{}", e);
        std::process::exit(if e.is_recoverable() { 2 } else { 1 });
    }
}

fn run(store: &mut dyn RecordStore, command: Commands) -> Result<()> {
    match command {
        Commands::Create(fields) => {
            let id = store.create(fields.into())?;
            println!("Record #{} is created.", id);
        }
        Commands::Update { id, fields } => {
            store.edit(id, fields.into())?;
            println!("Record #{} is updated.", id);
        }
        Commands::Delete { id } => {
            store.delete(id)?;
            println!("Record #{} is deleted.", id);
        }
        Commands::Purge => {
            let before = store.stat();
            let reclaimed = store.purge()?;
            println!(
                "Data file processing is completed: {} of {} records were purged.",
                reclaimed,
                before + reclaimed
            );
        }
        Commands::Stat => {
            println!("{} record(s).", store.stat());
        }
        Commands::List => print_records(&store.all_records()?),
        Commands::Find { by } => {
            let records = match by {
                FindBy::FirstName { name } => store.find_by_first_name(&name)?,
                FindBy::LastName { name } => store.find_by_last_name(&name)?,
                FindBy::DateOfBirth { date } => store.find_by_date_of_birth(date)?,
            };
            print_records(&records);
        }
        Commands::Export { path } => {
            let snapshot = store.snapshot()?;
            snapshot.save(&path)?;
            println!("All records are exported to file {}.", path.display());
        }
        Commands::Import { path } => {
            let snapshot = Snapshot::load(&path)?;
            store.restore(&snapshot)?;
            println!(
                "{} records were imported from {}.",
                snapshot.len(),
                path.display()
            );
        }
    }
    Ok(())
}

fn print_records(records: &[Record]) {
    if records.is_empty() {
        println!("No records found.");
        return;
    }
    for r in records {
        println!(
            "#{}, {}, {}, {}, {}, {}, {}",
            r.id,
            r.first_name,
            r.last_name,
            r.date_of_birth.format("%Y-%b-%d"),
            r.working_hours_per_week,
            r.annual_income,
            r.driver_license_category
        );
    }
}
