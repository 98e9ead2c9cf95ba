use std::fmt;
use std::path::PathBuf;

use services::{AppServices, Clock, QuestionnaireLoopService};
use tracing::{Level, debug, info};
use tracing_subscriber::{EnvFilter, fmt as log_fmt, layer::SubscriberExt, util::SubscriberInitExt};
use trip_core::model::AnswerSet;
use trip_core::{locate, plan_questions};

const DEFAULT_DB_URL: &str = "sqlite://trip.sqlite3";
const DEFAULT_LIST_LIMIT: u32 = 20;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingAnswers,
    UnknownArg(String),
    UnknownCommand(String),
    InvalidStep { raw: String },
    InvalidLimit { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingAnswers => write!(f, "--answers <file.json> is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidStep { raw } => write!(f, "invalid --step value: {raw}"),
            ArgsError::InvalidLimit { raw } => write!(f, "invalid --limit value: {raw}"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app plan --answers <file.json> [--step <n>]");
    eprintln!("  app run  --answers <file.json> [--db <sqlite_url>]");
    eprintln!("  app list [--db <sqlite_url>] [--limit <n>]");
    eprintln!();
    eprintln!("Global flags:");
    eprintln!("  --log-level <trace|debug|info|warn|error>");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}   (sqlite::memory: keeps nothing)");
    eprintln!("  --step 1");
    eprintln!("  --limit {DEFAULT_LIST_LIMIT}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRIP_DB_URL, TRIP_LOG_LEVEL, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Plan { answers: PathBuf, step: u32 },
    Run { answers: PathBuf },
    List { limit: u32 },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    command: Command,
    db_url: String,
    log_level: Option<String>,
}

impl Args {
    fn parse(
        argv: impl IntoIterator<Item = String>,
        env_db_url: Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut args = argv.into_iter();
        let Some(cmd) = args.next() else {
            return Ok(Self {
                command: Command::Help,
                db_url: DEFAULT_DB_URL.into(),
                log_level: None,
            });
        };

        let mut db_url = env_db_url.map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut log_level = None;
        let mut answers = None;
        let mut step = 1_u32;
        let mut limit = DEFAULT_LIST_LIMIT;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--answers" => {
                    answers = Some(PathBuf::from(require_value(&mut args, "--answers")?));
                }
                "--step" => {
                    let value = require_value(&mut args, "--step")?;
                    step = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidStep { raw: value.clone() })?;
                }
                "--limit" => {
                    let value = require_value(&mut args, "--limit")?;
                    limit = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidLimit { raw: value.clone() })?;
                }
                "--log-level" => {
                    log_level = Some(require_value(&mut args, "--log-level")?);
                }
                "--help" | "-h" => {
                    return Ok(Self {
                        command: Command::Help,
                        db_url,
                        log_level,
                    });
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let command = match cmd.as_str() {
            "plan" => Command::Plan {
                answers: answers.ok_or(ArgsError::MissingAnswers)?,
                step,
            },
            "run" => Command::Run {
                answers: answers.ok_or(ArgsError::MissingAnswers)?,
            },
            "list" => Command::List { limit },
            "--help" | "-h" | "help" => Command::Help,
            other => return Err(ArgsError::UnknownCommand(other.to_string())),
        };

        Ok(Self {
            command,
            db_url,
            log_level,
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
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{level_str}', defaulting to INFO. Valid levels: trace, debug, info, warn, error"
            );
            Level::INFO
        }
    }
}

fn init_logging(log_level: Option<&str>) {
    let level = log_level
        .map(str::to_owned)
        .or_else(|| std::env::var("TRIP_LOG_LEVEL").ok())
        .map_or(Level::WARN, |raw| parse_level(&raw));

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(format!("app={level},services={level},storage={level},sqlx=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(log_fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

fn read_answers(path: &PathBuf) -> Result<AnswerSet, Box<dyn std::error::Error>> {
    let raw = if path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin())?
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&raw)?)
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

async fn open_services(db_url: &str) -> Result<AppServices, Box<dyn std::error::Error>> {
    let clock = Clock::default();
    // Each pooled connection to `sqlite::memory:` would get its own database.
    if db_url == "sqlite::memory:" {
        return Ok(AppServices::in_memory(clock));
    }
    prepare_sqlite_file(db_url)?;
    Ok(AppServices::new_sqlite(db_url, clock).await?)
}

fn plan(answers: &AnswerSet, step: u32) -> Result<(), Box<dyn std::error::Error>> {
    let plan = plan_questions(answers);
    let position = locate(plan.milestones(), step);
    let output = serde_json::json!({
        "total_steps": plan.total_steps(),
        "milestones": plan.milestones(),
        "questions": plan.questions(),
        "current_step": step,
        "position": position,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Answers each planned question from `answers` until one is missing, then
/// submits if the run reached finalization. Returns the JSON report.
async fn replay(
    svc: &QuestionnaireLoopService,
    answers: &AnswerSet,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let mut session = svc.start().await?;

    while let Some(question) = session.current_question() {
        let Some(value) = answers.get(question.key.as_str()) else {
            debug!(question = %question.key, "no answer supplied, stopping");
            break;
        };
        svc.answer_current(&mut session, value.clone()).await?;
    }

    let progress = session.progress();
    if !progress.is_at_finalization {
        info!(draft_id = %session.draft_id(), "questionnaire left as draft");
        return Ok(serde_json::json!({
            "draft_id": session.draft_id().value(),
            "progress": progress,
            "missing": session.current_question().map(|q| q.key),
        }));
    }

    let id = svc.submit(&mut session).await?;
    Ok(serde_json::json!({
        "submission_id": id.value(),
        "milestones": session.milestones(),
        "progress": progress,
    }))
}

async fn list(svc: &QuestionnaireLoopService, limit: u32) -> Result<(), Box<dyn std::error::Error>> {
    let rows = svc.list_submissions(limit).await?;
    let output: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            serde_json::json!({
                "id": row.id.value(),
                "draft_id": row.submission.draft_id().value(),
                "submitted_at": row.submission.submitted_at(),
                "question_count": row.submission.question_count(),
                "answers": row.submission.answers(),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let parsed = Args::parse(argv, std::env::var("TRIP_DB_URL").ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_logging(parsed.log_level.as_deref());

    match &parsed.command {
        Command::Help => {
            print_usage();
            Ok(())
        }
        Command::Plan { answers, step } => plan(&read_answers(answers)?, *step),
        Command::Run { answers } => {
            let answers = read_answers(answers)?;
            let services = open_services(&parsed.db_url).await?;
            let report = replay(&services.questionnaire(), &answers).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::List { limit } => {
            let services = open_services(&parsed.db_url).await?;
            list(&services.questionnaire(), *limit).await
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trip_core::model::{AnswerValue, DraftId, SubmissionId};
    use trip_core::time::fixed_now;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn parses_plan_with_step() {
        let args = Args::parse(argv(&["plan", "--answers", "a.json", "--step", "7"]), None).unwrap();
        assert_eq!(
            args.command,
            Command::Plan {
                answers: PathBuf::from("a.json"),
                step: 7
            }
        );
        assert_eq!(args.db_url, DEFAULT_DB_URL);
    }

    #[test]
    fn plan_requires_answers() {
        let err = Args::parse(argv(&["plan"]), None).unwrap_err();
        assert!(matches!(err, ArgsError::MissingAnswers));
    }

    #[test]
    fn env_db_url_is_overridden_by_flag() {
        let args = Args::parse(
            argv(&["list", "--db", "sqlite::memory:", "--limit", "3"]),
            Some("sqlite://from-env.sqlite3".into()),
        )
        .unwrap();
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(args.command, Command::List { limit: 3 });
    }

    #[test]
    fn rejects_unknown_command_and_bad_numbers() {
        assert!(matches!(
            Args::parse(argv(&["fly"]), None),
            Err(ArgsError::UnknownCommand(_))
        ));
        assert!(matches!(
            Args::parse(argv(&["list", "--limit", "many"]), None),
            Err(ArgsError::InvalidLimit { .. })
        ));
    }

    #[test]
    fn empty_argv_is_help() {
        assert_eq!(Args::parse(Vec::new(), None).unwrap().command, Command::Help);
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/trip.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/trip.sqlite3"));
    }

    #[test]
    fn parse_level_defaults_to_info() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("loud"), Level::INFO);
    }

    fn flights_only_answers() -> AnswerSet {
        AnswerSet::new()
            .with("travelGroup", "solo")
            .with("helpWith", AnswerValue::list(["flights"]))
            .with("hasDestination", "yes")
            .with("destination", "Lisbon")
            .with("datesType", "fixed")
            .with("exactDates", "2026-07-01/2026-07-10")
            .with("budget", "moderate")
            .with("departureCity", "Paris")
            .with("flightPreferences", "direct")
    }

    #[tokio::test]
    async fn replay_stops_at_first_missing_answer() {
        let services = AppServices::in_memory(Clock::fixed(fixed_now()));
        let svc = services.questionnaire();
        let mut answers = flights_only_answers();
        answers.remove("budget");

        let report = replay(&svc, &answers).await.unwrap();
        assert_eq!(report["missing"], "budget");
        assert!(report.get("submission_id").is_none());

        let draft_id = DraftId::new(report["draft_id"].as_u64().unwrap());
        let draft = svc.resume(draft_id).await.unwrap();
        assert_eq!(draft.answers().text("exactDates"), Some("2026-07-01/2026-07-10"));
        assert!(svc.list_submissions(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replay_submits_a_complete_answer_set() {
        let services = AppServices::in_memory(Clock::fixed(fixed_now()));
        let svc = services.questionnaire();

        let report = replay(&svc, &flights_only_answers()).await.unwrap();
        let id = SubmissionId::new(report["submission_id"].as_u64().unwrap());
        assert_eq!(report["progress"]["is_at_finalization"], true);

        let stored = svc.get_submission(id).await.unwrap();
        assert_eq!(stored.question_count(), 9);
        assert_eq!(stored.answers().text("departureCity"), Some("Paris"));
        assert_eq!(svc.list_submissions(10).await.unwrap().len(), 1);
    }
}
