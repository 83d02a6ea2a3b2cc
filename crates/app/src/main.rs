use std::fmt;
use std::sync::Arc;

use services::modes::{Face, TIME_UP, TimedWritingView, Transition};
use services::{
    Clock, DatasetPaths, FileSeedSource, HttpSeedSource, Notice, SeedSource, StudyApp,
    StudyOptions, Tab,
};
use storage::repository::Storage;
use study_core::model::{DatasetSelector, DifficultyRating, ItemId};
use study_core::quiz::{Mark, QuizResult, TruthLabel};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDataset { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDataset { raw } => write!(f, "invalid --dataset value: {raw}"),
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

struct Args {
    db_url: String,
    dataset: Option<DatasetSelector>,
    base: String,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [run] [--db <sqlite_url>] [--dataset general|weekly] [--base <url-or-dir>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://study.sqlite3");
    eprintln!("  --base .");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  STUDY_DB_URL, STUDY_BASE_URL, STUDY_GENERAL_PATH, STUDY_WEEKLY_PATH, RUST_LOG");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("STUDY_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://study.sqlite3".into(), normalize_sqlite_url);
        let mut base = std::env::var("STUDY_BASE_URL").unwrap_or_else(|_| ".".into());
        let mut dataset = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--dataset" => {
                    let value = require_value(args, "--dataset")?;
                    let parsed = value
                        .parse::<DatasetSelector>()
                        .map_err(|_| ArgsError::InvalidDataset { raw: value.clone() })?;
                    dataset = Some(parsed);
                }
                "--base" => base = require_value(args, "--base")?,
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
            base,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

fn seed_source(base: &str) -> Result<Arc<dyn SeedSource>, Box<dyn std::error::Error>> {
    let paths = DatasetPaths::from_env();
    let source: Arc<dyn SeedSource> = if base.starts_with("http://") || base.starts_with("https://")
    {
        Arc::new(HttpSeedSource::new(base, paths)?)
    } else {
        Arc::new(FileSeedSource::new(base, paths))
    };
    Ok(source)
}

fn print_notices(notices: Vec<Notice>) {
    for notice in notices {
        println!("{notice}");
    }
}

fn print_result(result: Option<&QuizResult>) {
    let Some(result) = result else {
        println!("Nothing to check.");
        return;
    };
    for (index, mark) in result.marks.iter().enumerate() {
        let label = match mark {
            Mark::Correct => "correct",
            Mark::Incorrect => "incorrect",
            Mark::Unanswered => "unanswered",
        };
        println!("  {}. {label}", index + 1);
    }
    println!("Score: {}", result.score);
}

fn print_tab(app: &StudyApp) {
    println!("== {} ==  [{}]", app.active_tab(), app.switch_label());
    match app.active_tab() {
        Tab::Flashcards => {
            let cards = app.flashcards();
            if let Some(guidance) = cards.guidance() {
                println!("{guidance}");
            }
            for (index, card) in cards.views().iter().enumerate() {
                if let Some(buffer) = &card.editing {
                    println!("{:>3}. [editing] {} | {}", index + 1, buffer.prompt, buffer.answer);
                    continue;
                }
                let text = match card.face {
                    Face::Front => &card.prompt,
                    Face::Back => &card.answer,
                };
                println!("{:>3}. (#{}) {text}", index + 1, card.number);
            }
        }
        Tab::MultipleChoice => {
            let choice = app.multiple_choice();
            if let Some(guidance) = choice.guidance() {
                println!("{guidance}");
            }
            for (index, question) in choice.questions().iter().enumerate() {
                println!("{:>3}. {}", index + 1, question.prompt);
                for (option, text) in question.options.iter().enumerate() {
                    let marker = if choice.selection(index) == Some(text.as_str()) {
                        "*"
                    } else {
                        " "
                    };
                    println!("      {marker}{}) {text}", option + 1);
                }
            }
        }
        Tab::TrueFalse => {
            let quiz = app.true_false();
            if let Some(guidance) = quiz.guidance() {
                println!("{guidance}");
            }
            for (index, question) in quiz.questions().iter().enumerate() {
                let picked = quiz
                    .selection(index)
                    .map_or_else(|| "-".to_owned(), |label| label.to_string());
                println!(
                    "{:>3}. {} -> {}  [{picked}]",
                    index + 1,
                    question.prompt,
                    question.statement
                );
            }
        }
        Tab::TimedWriting => {
            let view = app.writing().view();
            if let Some(message) = view.message {
                println!("{message}");
            }
            if let (Some(number), Some(prompt)) = (view.number, &view.prompt) {
                println!("Question {number} of {}: {prompt}", view.total);
            }
            if let Some(timer) = &view.timer_text {
                println!("{timer}");
            }
            if let Some(answer) = &view.answer {
                println!("Your answer: {}", view.response);
                println!("Expected:    {answer}");
                for rating in DifficultyRating::ALL {
                    println!("  rate {}", rating.label());
                }
            }
        }
        Tab::Add => println!("add <prompt> | <answer>"),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  tab <flashcards|mc|tf|writing|add>   show   switch   quit");
    println!("  flip <n>   edit <n>   text <prompt> | <answer>   save   cancel");
    println!("  delete <n>   confirm   keep");
    println!("  add <prompt> | <answer>");
    println!("  pick <question> <option>   answer <question> true|false   check");
    println!("  write <text>   rate easy|medium|hard");
}

fn split_pair(rest: &str) -> Option<(&str, &str)> {
    rest.split_once('|').map(|(a, b)| (a.trim(), b.trim()))
}

fn card_at(app: &StudyApp, raw: &str) -> Option<ItemId> {
    let index: usize = raw.trim().parse().ok()?;
    app.flashcards()
        .views()
        .get(index.checked_sub(1)?)
        .map(|card| card.id)
}

fn one_based(raw: Option<&str>) -> Option<usize> {
    raw?.trim().parse::<usize>().ok()?.checked_sub(1)
}

/// Apply one command line. Returns `false` to stop the loop.
async fn dispatch(app: &mut StudyApp, line: &str) -> bool {
    let line = line.trim();
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let outcome: Result<(), String> = match command {
        "" => Ok(()),
        "quit" | "exit" => return false,
        "help" => {
            print_help();
            Ok(())
        }
        "show" => Ok(()),
        "tab" => rest
            .parse::<Tab>()
            .map(|tab| app.show_tab(tab)),
        "switch" => {
            app.switch_dataset().await;
            Ok(())
        }
        "add" => match split_pair(rest) {
            Some((prompt, answer)) => app
                .add_item(prompt, answer)
                .await
                .map(|_| ())
                .map_err(|err| err.to_string()),
            None => Err("usage: add <prompt> | <answer>".into()),
        },
        "flip" => match card_at(app, rest) {
            Some(id) => app.flip(id).map_err(|err| err.to_string()),
            None => Err("usage: flip <n>".into()),
        },
        "edit" => match card_at(app, rest) {
            Some(id) => app.start_edit(id).map_err(|err| err.to_string()),
            None => Err("usage: edit <n>".into()),
        },
        "text" => match split_pair(rest) {
            Some((prompt, answer)) => app
                .update_edit(prompt, answer)
                .map_err(|err| err.to_string()),
            None => Err("usage: text <prompt> | <answer>".into()),
        },
        "save" => app
            .save_edit()
            .await
            .map(|_| ())
            .map_err(|err| err.to_string()),
        "cancel" => {
            app.cancel_edit();
            Ok(())
        }
        "delete" => match card_at(app, rest) {
            Some(id) => app
                .request_delete(id)
                .map(|question| println!("{question} (confirm / keep)"))
                .map_err(|err| err.to_string()),
            None => Err("usage: delete <n>".into()),
        },
        "confirm" => app
            .confirm_delete()
            .await
            .map(|_| ())
            .map_err(|err| err.to_string()),
        "keep" => {
            app.cancel_delete();
            Ok(())
        }
        "pick" => {
            let mut parts = rest.split_whitespace();
            match (one_based(parts.next()), one_based(parts.next())) {
                (Some(question), Some(option)) => app
                    .select_choice(question, option)
                    .map_err(|err| err.to_string()),
                _ => Err("usage: pick <question> <option>".into()),
            }
        }
        "answer" => {
            let mut parts = rest.split_whitespace();
            let question = one_based(parts.next());
            let label = parts.next().map(str::parse::<TruthLabel>);
            match (question, label) {
                (Some(question), Some(Ok(label))) => app
                    .select_truth(question, label)
                    .map_err(|err| err.to_string()),
                _ => Err("usage: answer <question> true|false".into()),
            }
        }
        "check" => {
            match app.active_tab() {
                Tab::MultipleChoice => print_result(app.check_choice()),
                Tab::TrueFalse => print_result(app.check_true_false()),
                _ => println!("Open a quiz tab first."),
            }
            Ok(())
        }
        "write" => {
            if app.submit_writing(rest) == Transition::Ignored {
                println!("The answer is locked.");
            }
            Ok(())
        }
        "rate" => match DifficultyRating::parse(rest) {
            Some(rating) => app
                .rate_writing(rating)
                .map(|_| ())
                .map_err(|err| err.to_string()),
            None => Err("usage: rate easy|medium|hard".into()),
        },
        other => Err(format!("unknown command: {other} (try help)")),
    };

    if let Err(message) = outcome {
        println!("{message}");
    }
    print_notices(app.drain_notices());
    if !line.is_empty() && command != "help" {
        print_tab(app);
    }
    true
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();
    match argv.first().map(String::as_str) {
        Some("run") => {
            argv.remove(0);
        }
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if !first.starts_with("--") => {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            return Err(ArgsError::UnknownArg(first.to_owned()).into());
        }
        _ => {}
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite in the binary glue so services stay storage-agnostic.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;
    if let Some(dataset) = parsed.dataset {
        storage.items.save_selector(dataset).await?;
    }
    let source = seed_source(&parsed.base)?;

    let options = StudyOptions {
        clock: Clock::system(),
        observer: Some(Arc::new(|view: &TimedWritingView| {
            if view.timer_text.as_deref() == Some(TIME_UP) {
                println!("{TIME_UP}");
            }
        })),
        ..StudyOptions::default()
    };
    let mut app = StudyApp::init(storage.items.clone(), source, options).await;
    tracing::info!(dataset = app.selector().key(), items = app.repository().len(), "study app ready");

    print_notices(app.drain_notices());
    print_tab(&app);
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !dispatch(&mut app, &line).await {
            break;
        }
    }

    app.teardown();
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
