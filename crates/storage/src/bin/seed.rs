use std::fmt;

use storage::repository::Storage;
use study_core::model::{DatasetSelector, ItemRecord};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    dataset: DatasetSelector,
    file: String,
    force: bool,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFile,
    UnknownArg(String),
    InvalidDataset { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFile => write!(f, "--file is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDataset { raw } => {
                write!(f, "invalid --dataset value (expected general|weekly): {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("STUDY_DB_URL").unwrap_or_else(|_| "sqlite:study.sqlite3?mode=rwc".into());
        let mut dataset = DatasetSelector::default();
        let mut file = None;
        let mut force = false;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--dataset" => {
                    let value = require_value(&mut args, "--dataset")?;
                    dataset = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidDataset { raw: value.clone() })?;
                }
                "--file" => {
                    file = Some(require_value(&mut args, "--file")?);
                }
                "--force" => force = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            dataset,
            file: file.ok_or(ArgsError::MissingFile)?,
            force,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- --file <items.json> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:study.sqlite3?mode=rwc)");
    eprintln!("  --dataset <name>          general | weekly (default: general)");
    eprintln!("  --force                   overwrite a non-empty stored dataset");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  STUDY_DB_URL");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let raw = std::fs::read_to_string(&args.file)?;
    let records: Vec<ItemRecord> = serde_json::from_str(&raw)?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let existing = storage.items.load_items(args.dataset).await?;
    if !existing.is_empty() && !args.force {
        eprintln!(
            "seed: {} already holds {} items; pass --force to overwrite",
            args.dataset,
            existing.len()
        );
        return Ok(());
    }

    storage.items.save_items(args.dataset, &records).await?;
    println!(
        "seed: wrote {} items to {} ({})",
        records.len(),
        args.dataset,
        storage.items.collection_key(args.dataset)
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
