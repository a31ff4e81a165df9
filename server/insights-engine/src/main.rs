//! Binary entrypoint.
//!
//! - `report`: read one DashboardInput JSON object from stdin, write one
//!   DashboardReport (or ErrorOutput) JSON object to stdout.
//! - `score`: read JSON lines of `{"answers": {...}}` from stdin, write one
//!   ScoreBreakdown (or ErrorOutput) line per input line.
//!
//! Logs go to stderr so stdout stays machine-readable.

use std::collections::HashMap;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use insights_engine::ingest::parse_timestamp;
use insights_engine::types::{catalog_from, AnswerValue, ErrorOutput, Question};
use insights_engine::{Config, DashboardInput, Engine, EngineError};

#[derive(Parser)]
#[command(name = "insights-engine")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reflection scoring and insights aggregation", long_about = None)]
struct Cli {
  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// TOML config file (defaults apply when absent)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build a dashboard report from one JSON snapshot on stdin
  Report {
    /// Reference instant (RFC 3339); overrides the input's `now`
    #[arg(long)]
    now: Option<String>,
  },

  /// Score JSON-lines answer sets from stdin
  Score {
    /// Question catalog JSON: a list or `{"questions": [...]}`
    #[arg(long)]
    questions: PathBuf,
  },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionFile {
  List(Vec<Question>),
  Wrapped { questions: Vec<Question> },
}

#[derive(Deserialize)]
struct ScoreLine {
  #[serde(default)]
  answers: HashMap<String, AnswerValue>,
}

fn main() {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(io::stderr)
    .init();

  if let Err(e) = run(cli) {
    let _ = writeln!(io::stderr(), "insights-engine: {:#}", e);
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  let config = match &cli.config {
    Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
    None => Config::default(),
  };
  let engine = Engine::new(config);

  match cli.command {
    Commands::Report { now } => run_report(&engine, now.as_deref()),
    Commands::Score { questions } => run_score(&engine, &questions),
  }
}

fn run_report(engine: &Engine, now: Option<&str>) -> Result<()> {
  let mut raw = String::new();
  io::stdin().lock().read_to_string(&mut raw)?;

  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());

  let result = serde_json::from_str::<DashboardInput>(&raw)
    .map_err(EngineError::from)
    .and_then(|input| match now {
      Some(flag) => parse_timestamp(flag)
        .map_err(|e| EngineError::validation("now", &e.to_string()))
        .map(|ts| engine.report_at(&input, ts)),
      None => engine.report(&input, Utc::now()),
    });

  match result {
    Ok(report) => {
      info!(
        "report {} with {} records, {} domains",
        report.report_id,
        report.records.len(),
        report.domains.len()
      );
      serde_json::to_writer(&mut out, &report)?;
    }
    Err(e) => serde_json::to_writer(&mut out, &error_output(&e))?,
  }
  writeln!(out)?;
  out.flush()?;
  Ok(())
}

fn run_score(engine: &Engine, questions_path: &Path) -> Result<()> {
  let questions = load_questions(questions_path)
    .with_context(|| format!("loading questions from {}", questions_path.display()))?;
  let catalog = catalog_from(&questions);
  debug!("loaded {} questions", catalog.len());

  let stdin = io::stdin();
  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());

  for line in stdin.lock().lines() {
    let line = line.context("read error")?;

    // Skip blank lines.
    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    match serde_json::from_str::<ScoreLine>(trimmed) {
      Ok(entry) => {
        let breakdown = engine.score(&entry.answers, &catalog);
        serde_json::to_writer(&mut out, &breakdown)?;
      }
      Err(e) => {
        let err = ErrorOutput::new(format!("json parse: {}", e));
        serde_json::to_writer(&mut out, &err)?;
      }
    }
    writeln!(out)?;
  }

  out.flush()?;
  Ok(())
}

fn load_questions(path: &Path) -> Result<Vec<Question>, EngineError> {
  let content = std::fs::read_to_string(path)?;
  let file: QuestionFile = serde_json::from_str(&content)
    .map_err(|e| EngineError::parse(format!("question catalog: {}", e)))?;
  Ok(match file {
    QuestionFile::List(list) => list,
    QuestionFile::Wrapped { questions } => questions,
  })
}

fn error_output(e: &EngineError) -> ErrorOutput {
  match e {
    EngineError::Validation { field, reason } => ErrorOutput::new(reason.clone()).with_field(field.clone()),
    _ => ErrorOutput::new(e.to_string()),
  }
}
