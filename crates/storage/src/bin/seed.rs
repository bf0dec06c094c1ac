use std::fmt;

use storage::keys;
use storage::repository::{KeyValueStore, Storage};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    module: String,
    lesson: Option<usize>,
    completed: Vec<String>,
    passed: bool,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingModule,
    InvalidLesson { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingModule => write!(f, "--module is required"),
            ArgsError::InvalidLesson { raw } => write!(f, "invalid --lesson value: {raw}"),
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
            std::env::var("LEARN_DB_URL").unwrap_or_else(|_| "sqlite:theory.sqlite3".into());
        let mut module = std::env::var("LEARN_MODULE").ok();
        let mut lesson = None;
        let mut completed = Vec::new();
        let mut passed = false;

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
                "--module" => module = Some(require_value(&mut args, "--module")?),
                "--lesson" => {
                    let value = require_value(&mut args, "--lesson")?;
                    let parsed: usize = value
                        .trim()
                        .parse()
                        .map_err(|_| ArgsError::InvalidLesson { raw: value.clone() })?;
                    lesson = Some(parsed);
                }
                "--completed" => {
                    let value = require_value(&mut args, "--completed")?;
                    completed.extend(
                        value
                            .split(',')
                            .map(str::trim)
                            .filter(|id| !id.is_empty())
                            .map(str::to_owned),
                    );
                }
                "--passed" => passed = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            module: module.ok_or(ArgsError::MissingModule)?,
            lesson,
            completed,
            passed,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- --module <title> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:theory.sqlite3)");
    eprintln!("  --module <title>          Module whose keys are written");
    eprintln!("  --lesson <n>              Last viewed lesson index");
    eprintln!("  --completed <id,id,...>   Completed lesson ids");
    eprintln!("  --passed                  Mark the module assessment as passed");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  LEARN_DB_URL, LEARN_MODULE");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;

    if let Some(lesson) = args.lesson {
        storage
            .kv
            .set(&keys::last_lesson(&args.module), &lesson.to_string())
            .await?;
    }
    if !args.completed.is_empty() {
        let mut ids: Vec<&str> = Vec::new();
        for id in &args.completed {
            if !ids.contains(&id.as_str()) {
                ids.push(id);
            }
        }
        storage
            .kv
            .set(
                &keys::completed_lessons(&args.module),
                &serde_json::to_string(&ids)?,
            )
            .await?;
    }
    if args.passed {
        storage
            .kv
            .set(&keys::assessment_passed(&args.module), "true")
            .await?;
    }

    println!(
        "Seeded module {:?} (lesson: {:?}, completed: {}, passed: {}) into {}",
        args.module,
        args.lesson,
        args.completed.len(),
        args.passed,
        args.db_url
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
