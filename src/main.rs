use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use coachrs::config::AppConfig;
use coachrs::database::Database;
use coachrs::error::CoachError;
use coachrs::history::{HistoryIndex, SessionLog};
use coachrs::logging::{init_logging, LogLevel};
use coachrs::models::{Block, DayPlan, PlanDocument, WeekPlan, WorkoutData};
use coachrs::parser::WorkoutParser;
use coachrs::schedule::{day_plan_for_date, normalize_weekday, start_of_week};
use coachrs::session::WorkoutSession;

/// CoachRS - Workout Plan CLI
///
/// Turns generated free-text workout plans into trackable blocks, stores week
/// plans and finished sessions, and carries weights forward between sessions.
#[derive(Parser)]
#[command(name = "coachrs")]
#[command(version)]
#[command(about = "Workout plan parsing and tracking CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a day plan JSON file into blocks
    Parse {
        /// Day plan file
        #[arg(short, long)]
        plan: PathBuf,

        /// Completed logs (JSON array, newest first) for weight carry-forward
        #[arg(long)]
        history: Option<PathBuf>,

        #[arg(short = 'f', long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show the stored workout for a user and date
    Day {
        #[arg(short, long)]
        user: String,

        /// Workout date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,

        #[arg(short = 'f', long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Store a generated week plan
    ImportPlan {
        #[arg(short, long)]
        user: String,

        /// Any date within the week; snapped to the configured week start
        #[arg(short, long)]
        week_start: NaiveDate,

        /// Plan document (raw generator output is accepted)
        #[arg(short = 'F', long)]
        file: PathBuf,
    },

    /// Save a finished session as a completed workout log
    Finish {
        #[arg(short, long)]
        user: String,

        #[arg(short, long)]
        date: NaiveDate,

        /// Session JSON as produced by `parse --format json`, with edits
        #[arg(short, long)]
        session: PathBuf,
    },

    /// Show last performance per exercise
    History {
        #[arg(short, long)]
        user: String,

        /// Number of completed sessions to read
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Configure application settings
    Config {
        /// List all configuration options
        #[arg(short, long)]
        list: bool,

        /// Set a configuration value (key=value)
        #[arg(short, long)]
        set: Option<String>,

        /// Get a configuration value
        #[arg(short, long)]
        get: Option<String>,

        /// Write a default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Tabled)]
struct BlockRow {
    #[tabled(rename = "#")]
    id: String,
    #[tabled(rename = "Type")]
    block_type: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Details")]
    details: String,
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Exercise")]
    exercise: String,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Reps")]
    reps: String,
    #[tabled(rename = "Date")]
    date: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_config_path);
    let mut config = if config_path.exists() {
        AppConfig::load_from_file(&config_path)?
    } else {
        AppConfig::default()
    };

    let mut log_config = config.logging.clone();
    log_config.level = LogLevel::from_verbosity(cli.verbose, log_config.level);
    init_logging(&log_config)?;

    match cli.command {
        Commands::Parse { plan, history, format } => {
            let day_plan: DayPlan = read_json(&plan)?;
            let logs: Vec<SessionLog> = match history {
                Some(path) => read_json(&path)?,
                None => Vec::new(),
            };

            let parser = WorkoutParser::with_settings(config.parser.clone());
            let data = parser.parse_with_history(&day_plan, &logs);
            print_workout(&data, format)?;
        }

        Commands::Day { user, date, format } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let db = Database::new(&config.storage.database_path)?;
            let plans = db.week_plans(&user)?;

            let day_plan = match day_plan_for_date(&plans, &user, date) {
                Ok(day_plan) => day_plan,
                Err(err) => {
                    let err = CoachError::from(err);
                    tracing::warn!(error = %err, "no workout for date");
                    println!("{}", err.user_message().yellow());
                    return Ok(());
                }
            };

            let logs = db.recent_completed_logs(&user, config.parser.history_depth)?;
            let parser = WorkoutParser::with_settings(config.parser.clone());
            let data = parser.parse_with_history(day_plan, &logs);
            print_workout(&data, format)?;
        }

        Commands::ImportPlan { user, week_start, file } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read plan file: {}", file.display()))?;
            let document = PlanDocument::from_json(&text)?.normalize_week();

            let first_day = normalize_weekday(&config.schedule.week_start)
                .with_context(|| format!("Invalid week start: {}", config.schedule.week_start))?;
            let week_start_date = start_of_week(week_start, first_day);

            let mut db = Database::new(&config.storage.database_path)?;
            db.store_week_plan(&WeekPlan {
                user_id: user.clone(),
                week_start_date: Some(week_start_date),
                plan: document,
            })?;

            println!(
                "{}",
                format!("✓ Stored week plan for {} starting {}", user, week_start_date).green()
            );
        }

        Commands::Finish { user, date, session } => {
            let data: WorkoutData = read_json(&session)?;
            let session = WorkoutSession::new(data);
            let progress = session.progress_percent();

            let mut db = Database::new(&config.storage.database_path)?;
            db.upsert_log(&user, &session.to_log(&user, date))?;

            println!(
                "{}",
                format!("✓ Workout for {} saved ({}% complete)", date, progress).green().bold()
            );
        }

        Commands::History { user, limit } => {
            let depth = limit.unwrap_or(config.parser.history_depth);
            let db = Database::new(&config.storage.database_path)?;
            let logs = db.recent_completed_logs(&user, depth)?;
            let index = HistoryIndex::from_logs(&logs, depth);

            if index.is_empty() {
                println!("{}", "No lifts recorded yet.".dimmed());
                return Ok(());
            }

            let rows: Vec<HistoryRow> = index
                .entries()
                .into_iter()
                .map(|(name, entry)| HistoryRow {
                    exercise: name.to_string(),
                    weight: entry.weight.clone(),
                    reps: entry.reps.clone(),
                    date: entry.workout_date.to_string(),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }

        Commands::Config { list, set, get, init } => {
            if init {
                let mut fresh = AppConfig::default();
                fresh.save_to_file(&config_path)?;
                println!("{}", format!("✓ Wrote {}", config_path.display()).green());
            } else if list {
                for key in AppConfig::keys() {
                    println!("{} = {}", key.cyan(), config.get(key)?);
                }
            } else if let Some(key_value) = set {
                let (key, value) = key_value
                    .split_once('=')
                    .with_context(|| format!("Expected key=value, got: {}", key_value))?;
                config.set(key.trim(), value.trim())?;
                config.save_to_file(&config_path)?;
                println!("{}", format!("✓ {} = {}", key.trim(), value.trim()).green());
            } else if let Some(key) = get {
                println!("{}", config.get(&key)?);
            } else {
                println!("{}", format!("Config file: {}", config_path.display()).dimmed());
            }
        }
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn print_workout(data: &WorkoutData, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Table => {
            let title = format!("{} Session", data.day_plan.weekday);
            println!("{}", title.bold());
            if data.is_pure_endurance_day {
                println!("{}", "Endurance day".cyan());
            }
            if !data.general_notes.is_empty() {
                println!("{}", data.general_notes.dimmed());
            }

            if data.blocks.is_empty() {
                println!("{}", "Rest day - nothing scheduled.".dimmed());
                return Ok(());
            }

            let rows: Vec<BlockRow> = data.blocks.iter().map(block_row).collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
    }
    Ok(())
}

fn block_row(block: &Block) -> BlockRow {
    let details = if block.is_exercise() {
        let first = block.sets.first();
        let reps = first.map(|s| s.reps.as_str()).filter(|r| !r.is_empty()).unwrap_or("-");
        match first.filter(|s| s.has_weight()) {
            Some(set) => format!("{} x {} @ {}", block.sets.len(), reps, set.weight),
            None => format!("{} x {}", block.sets.len(), reps),
        }
    } else {
        match (block.duration_seconds, block.mode) {
            (Some(secs), Some(mode)) => format!("{}:{:02} {}", secs / 60, secs % 60, mode),
            (Some(secs), None) => format!("{}:{:02}", secs / 60, secs % 60),
            (None, Some(mode)) => mode.to_string(),
            (None, None) => block.instructions.len().to_string() + " notes",
        }
    };

    BlockRow {
        id: block.id.clone(),
        block_type: block.block_type.to_string(),
        name: block.name.clone(),
        details,
    }
}
