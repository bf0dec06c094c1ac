use std::fmt;
use std::time::Duration;

use learn_core::assessment::Answers;
use learn_core::model::{LessonBlock, QuestionId};
use learn_core::progression::Navigation;
use learn_core::query::LessonQuery;
use services::{AppServices, Clock, LessonView, SessionConfig, TheorySession};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingCatalog,
    InvalidDbUrl { raw: String },
    InvalidDwell { raw: String },
    InvalidAnswers { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingCatalog => write!(f, "--catalog (or LEARN_CATALOG) is required"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidDwell { raw } => write!(f, "invalid --dwell value: {raw}"),
            ArgsError::InvalidAnswers { raw } => {
                write!(f, "invalid --answers value (expected id=option,...): {raw}")
            }
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- show    --catalog <path> [--module <title>] [--query <qs>]");
    eprintln!("  cargo run -p app -- study   --catalog <path> [--module <title>] [--query <qs>]");
    eprintln!("  cargo run -p app -- modules --catalog <path>");
    eprintln!("  cargo run -p app -- score   --catalog <path> --module <title> --answers <1=0,2=1>");
    eprintln!();
    eprintln!("Common options:");
    eprintln!("  --db <sqlite_url>   default: sqlite://theory.sqlite3");
    eprintln!("  --dwell <secs>      lesson dwell time (default: 20)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LEARN_DB_URL, LEARN_CATALOG, LEARN_DWELL_SECS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Show,
    Study,
    Modules,
    Score,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "show" => Some(Self::Show),
            "study" => Some(Self::Study),
            "modules" => Some(Self::Modules),
            "score" => Some(Self::Score),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    catalog: String,
    module: Option<String>,
    query: String,
    dwell: Duration,
    answers: Answers,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("LEARN_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://theory.sqlite3".into(), normalize_sqlite_url);
        let mut catalog = std::env::var("LEARN_CATALOG").ok();
        let mut dwell = std::env::var("LEARN_DWELL_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or_else(|| SessionConfig::default().dwell, Duration::from_secs);
        let mut module = None;
        let mut query = String::new();
        let mut answers = Answers::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--catalog" => catalog = Some(require_value(args, "--catalog")?),
                "--module" => module = Some(require_value(args, "--module")?),
                "--query" => query = require_value(args, "--query")?,
                "--dwell" => {
                    let value = require_value(args, "--dwell")?;
                    let secs: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidDwell { raw: value.clone() })?;
                    dwell = Duration::from_secs(secs);
                }
                "--answers" => {
                    let value = require_value(args, "--answers")?;
                    answers = parse_answers(&value)?;
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
            catalog: catalog.ok_or(ArgsError::MissingCatalog)?,
            module,
            query,
            dwell,
            answers,
        })
    }
}

fn parse_answers(raw: &str) -> Result<Answers, ArgsError> {
    let invalid = || ArgsError::InvalidAnswers {
        raw: raw.to_string(),
    };
    raw.split(',')
        .filter(|pair| !pair.trim().is_empty())
        .map(|pair| {
            let (id, option) = pair.split_once('=').ok_or_else(invalid)?;
            let id: QuestionId = id.trim().parse().map_err(|_| invalid())?;
            let option: usize = option.trim().parse().map_err(|_| invalid())?;
            Ok((id, option))
        })
        .collect()
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

fn print_view(view: &LessonView, query: &LessonQuery) {
    println!(
        "── lesson {}/{}: {} ({:.0}%)  ?{query}",
        view.index + 1,
        view.lesson_count,
        view.title,
        view.percent
    );
    for block in &view.blocks {
        match block {
            LessonBlock::Narrative { markdown } => println!("{}", markdown.trim()),
            LessonBlock::Watch { url } => println!("[watch] {url}"),
            LessonBlock::TryIt { body } => println!("[try it] {}", body.trim()),
            LessonBlock::Quiz { question } => println!("[quiz] {}", question.trim()),
            LessonBlock::Diagram { body } => println!("[diagram]\n{body}"),
            LessonBlock::Example { body } => println!("[example] {}", body.trim()),
            LessonBlock::Interactive { body } => println!("[interactive] {}", body.trim()),
            LessonBlock::KeyPoints { points } | LessonBlock::BestPractices { points } => {
                let label = if matches!(block, LessonBlock::KeyPoints { .. }) {
                    "key points"
                } else {
                    "best practices"
                };
                println!("[{label}]");
                for point in points {
                    println!("  • {point}");
                }
            }
        }
        println!();
    }
}

async fn study(session: &mut TheorySession) {
    print_view(&session.view(), session.query());
    loop {
        if !session.can_advance() {
            match session.next_completion().await {
                Some(lesson) => info!(lesson, "lesson complete"),
                None => break,
            }
        }
        match session.next().await {
            Navigation::Moved { .. } => print_view(&session.view(), session.query()),
            Navigation::EnterAssessment => {
                println!("All lessons complete. Assessment unlocked.");
                break;
            }
            _ => break,
        }
    }
}

fn module_title(services: &AppServices, args: &Args) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(title) = &args.module {
        return Ok(title.clone());
    }
    let catalog = services.catalog();
    let first = catalog.modules().first().ok_or("catalog has no modules")?;
    Ok(first.title().to_owned())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Show,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Show,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let args = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let catalog = AppServices::load_catalog(&args.catalog)?;
    prepare_sqlite_file(&args.db_url)?;
    let config = SessionConfig::default().with_dwell(args.dwell);
    let services = AppServices::new_sqlite(&args.db_url, catalog, Clock::system(), config).await?;

    match cmd {
        Command::Show | Command::Study => {
            let title = module_title(&services, &args)?;
            let mut session = services
                .open_module(&title, LessonQuery::parse(&args.query))
                .await?;
            if cmd == Command::Study {
                study(&mut session).await;
            } else {
                print_view(&session.view(), session.query());
            }
        }
        Command::Modules => {
            let catalog = services.catalog();
            for module in catalog.modules() {
                let progress = services.progress(module.title()).await?;
                let passed = if services.passed(module.title()).await {
                    "  passed"
                } else {
                    ""
                };
                println!(
                    "{}: {}/{} lessons{passed}",
                    module.title(),
                    progress.completed,
                    progress.total
                );
            }
        }
        Command::Score => {
            let title = module_title(&services, &args)?;
            let report = services.score(&title, &args.answers).await?;
            println!(
                "{title}: {:.0}% ({}/{}) {:?}",
                report.score, report.correct, report.total, report.verdict
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_parse_into_question_map() {
        let answers = parse_answers("1=0, 2=2,").unwrap();
        assert_eq!(answers.get(&QuestionId::new(1)), Some(&0));
        assert_eq!(answers.get(&QuestionId::new(2)), Some(&2));
        assert!(parse_answers("").unwrap().is_empty());
    }

    #[test]
    fn malformed_answers_are_rejected() {
        assert!(matches!(
            parse_answers("1:0"),
            Err(ArgsError::InvalidAnswers { .. })
        ));
        assert!(parse_answers("x=1").is_err());
        assert!(parse_answers("1=-1").is_err());
    }

    #[test]
    fn memory_and_absolute_urls_pass_through() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/theory.sqlite3".into()),
            "sqlite:///tmp/theory.sqlite3"
        );
        assert_eq!(
            normalize_sqlite_url("/tmp/theory.sqlite3".into()),
            "sqlite:///tmp/theory.sqlite3"
        );
    }
}
