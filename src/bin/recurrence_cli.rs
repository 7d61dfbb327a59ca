use std::{path::PathBuf, process::ExitCode, sync::Arc};

use chrono::NaiveDate;
use colored::Colorize;
use uuid::Uuid;

use recurrence_core::{
    config::ConfigManager,
    scheduler::Scheduler,
    stores::JsonStore,
    Clock, RecurrenceEngine, SystemClock,
};

const USAGE: &str = "\
Usage:
  recurrence_cli run-now --owner <uuid> [--as-of YYYY-MM-DD] [--data-dir PATH]
  recurrence_cli daemon --owner <uuid> [--owner <uuid> ...] [--data-dir PATH]

Commands:
  run-now   Materialize due recurring templates for one owner and exit.
  daemon    Tick once per UTC day for the given owners, forever.
";

struct CliArgs {
    command: String,
    owners: Vec<Uuid>,
    as_of: Option<NaiveDate>,
    data_dir: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs, String> {
    let command = args.next().ok_or_else(|| "missing command".to_string())?;
    let mut owners = Vec::new();
    let mut as_of = None;
    let mut data_dir = None;

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--owner" => {
                let raw = args.next().ok_or("--owner requires a value")?;
                let id = Uuid::parse_str(&raw).map_err(|_| format!("invalid owner id: {raw}"))?;
                owners.push(id);
            }
            "--as-of" => {
                let raw = args.next().ok_or("--as-of requires a value")?;
                let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .map_err(|_| format!("invalid date: {raw}"))?;
                as_of = Some(date);
            }
            "--data-dir" => {
                let raw = args.next().ok_or("--data-dir requires a value")?;
                data_dir = Some(PathBuf::from(raw));
            }
            other => return Err(format!("unknown flag: {other}")),
        }
    }
    Ok(CliArgs {
        command,
        owners,
        as_of,
        data_dir,
    })
}

fn build_engine(data_dir: Option<PathBuf>) -> Result<Arc<RecurrenceEngine>, String> {
    let store = Arc::new(JsonStore::open(data_dir.clone()).map_err(|e| e.to_string())?);
    let config = match data_dir {
        Some(dir) => ConfigManager::with_base_dir(dir),
        None => ConfigManager::new(),
    }
    .and_then(|manager| manager.load())
    .map_err(|e| e.to_string())?;
    Ok(Arc::new(RecurrenceEngine::new(
        store.clone(),
        store.clone(),
        store,
        config,
    )))
}

fn run(args: CliArgs) -> Result<(), String> {
    let clock = SystemClock;
    match args.command.as_str() {
        "run-now" => {
            let owner = match args.owners.as_slice() {
                [single] => *single,
                _ => return Err("run-now requires exactly one --owner".into()),
            };
            let engine = build_engine(args.data_dir)?;
            let as_of = args.as_of.unwrap_or_else(|| clock.today());
            let summary = engine.run_due(owner, as_of).map_err(|e| e.to_string())?;
            println!(
                "{} due={} created={}",
                "recurring:".bold().green(),
                summary.due,
                summary.created
            );
            for failure in &summary.failures {
                eprintln!(
                    "{} template {}: {}",
                    "failed:".bold().red(),
                    failure.template_id,
                    failure.reason
                );
            }
            Ok(())
        }
        "daemon" => {
            if args.owners.is_empty() {
                return Err("daemon requires at least one --owner".into());
            }
            if args.as_of.is_some() {
                return Err("--as-of is only valid with run-now".into());
            }
            let engine = build_engine(args.data_dir)?;
            let scheduler = Scheduler::new(engine, Arc::new(clock), args.owners);
            scheduler.run_forever()
        }
        other => Err(format!("unknown command: {other}")),
    }
}

fn main() -> ExitCode {
    recurrence_core::init();
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{} {message}", "error:".bold().red());
            eprint!("{USAGE}");
            return ExitCode::from(2);
        }
    };
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{} {message}", "error:".bold().red());
            ExitCode::FAILURE
        }
    }
}
