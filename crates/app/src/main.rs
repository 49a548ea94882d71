use std::fmt;
use std::sync::Arc;

use quiz_core::model::{DEFAULT_QUESTION_TIME_SECS, SessionSettings};
use quiz_core::{QuestionSource, StaticQuestionBank};
use services::{Clock, TestSessionEngine};
use storage::repository::Storage;

mod runner;

const DEFAULT_SHUFFLE_SEED: u64 = 0x5eed;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidTimeLimit { source: &'static str, raw: String },
    InvalidSeed { source: &'static str, raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidTimeLimit { source, raw } => {
                write!(f, "invalid {source} value: {raw} (expected seconds > 0)")
            }
            ArgsError::InvalidSeed { source, raw } => write!(f, "invalid {source} value: {raw}"),
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

fn parse_time_limit(source: &'static str, raw: String) -> Result<u32, ArgsError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|secs| *secs > 0)
        .ok_or(ArgsError::InvalidTimeLimit { source, raw })
}

fn parse_seed(source: &'static str, raw: String) -> Result<u64, ArgsError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ArgsError::InvalidSeed { source, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz [run]   [options]   resume the saved session or start a new one");
    eprintln!("  quiz new     [options]   discard saved progress and start over");
    eprintln!("  quiz status  [options]   report whether a saved session exists");
    eprintln!("  quiz reset   [options]   delete saved progress");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         snapshot database (default: sqlite:quiz.sqlite3)");
    eprintln!("  --time-limit <secs>       default seconds per question (default: {DEFAULT_QUESTION_TIME_SECS})");
    eprintln!("  --shuffle-options         shuffle answer options");
    eprintln!("  --seed <u64>              seed used when shuffling options");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_TIME_LIMIT, QUIZ_SHUFFLE_OPTIONS, QUIZ_SEED, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run,
    New,
    Status,
    Reset,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "run" => Some(Self::Run),
            "new" => Some(Self::New),
            "status" => Some(Self::Status),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    time_limit_secs: u32,
    shuffle_options: bool,
    seed: u64,
}

impl Args {
    /// Parse flags on top of `QUIZ_*` values looked up through `env`.
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = normalize_sqlite_url(
            env("QUIZ_DB_URL").unwrap_or_else(|| "sqlite:quiz.sqlite3".into()),
        );
        let mut time_limit_secs = match env("QUIZ_TIME_LIMIT") {
            Some(raw) => parse_time_limit("QUIZ_TIME_LIMIT", raw)?,
            None => DEFAULT_QUESTION_TIME_SECS,
        };
        let mut shuffle_options = env("QUIZ_SHUFFLE_OPTIONS")
            .is_some_and(|value| matches!(value.as_str(), "1" | "true" | "yes"));
        let mut seed = match env("QUIZ_SEED") {
            Some(raw) => parse_seed("QUIZ_SEED", raw)?,
            None => DEFAULT_SHUFFLE_SEED,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--time-limit" => {
                    let value = require_value(args, "--time-limit")?;
                    time_limit_secs = parse_time_limit("--time-limit", value)?;
                }
                "--shuffle-options" => shuffle_options = true,
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    seed = parse_seed("--seed", value)?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            time_limit_secs,
            shuffle_options,
            seed,
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

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Run,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Run,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let env = |name: &str| std::env::var(name).ok();
    let parsed = Args::parse(&mut argv.into_iter(), env).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Storage setup stays in the binary so the library crates never touch the filesystem.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;

    let settings = SessionSettings::new(parsed.time_limit_secs, parsed.shuffle_options)?;
    let mut bank = StaticQuestionBank::new();
    if settings.shuffle_options() {
        bank = bank.with_shuffled_options(parsed.seed);
    }
    let bank: Arc<dyn QuestionSource> = Arc::new(bank);

    let mut engine = TestSessionEngine::open(
        Clock::default_clock(),
        settings,
        bank,
        Arc::clone(&storage.snapshots),
    )
    .await;
    log::debug!(
        "opened {} (resume available: {})",
        parsed.db_url,
        engine.resume_available()
    );

    match cmd {
        Command::Status => {
            if engine.resume_available() {
                println!("A saved session can be resumed. Run `quiz` to continue.");
            } else {
                println!("No saved session.");
            }
        }
        Command::Reset => {
            engine.discard_snapshot().await;
            println!("Saved session cleared.");
        }
        Command::New => {
            engine.start_new_session().await;
            runner::run_session(&mut engine).await?;
        }
        Command::Run => {
            if engine.resume_available() {
                engine.resume_session().await;
                println!("Resuming your saved session.");
            } else {
                engine.start_new_session().await;
            }
            runner::run_session(&mut engine).await?;
        }
    }

    if let Some(result) = engine.result() {
        runner::print_result(result);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
