//! qbreview - command-line front end for the review scheduler.
//!
//! # Configuration
//!
//! - `--config FILE` - TOML, JSON or YAML settings
//! - `QBREVIEW_STORAGE_BACKEND` - `sqlite` (default), `json_file` or `memory`
//! - `QBREVIEW_DATA_PATH` - Optional, defaults to `~/.qbreview/store.db`
//! - `QBREVIEW_URL_TEMPLATE` - Link template for due reviews
//! - `RUST_LOG` - Log filter, logs go to stderr

mod app;
mod commands;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use qbreview_core::AnswerGrade;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::App;

#[derive(Parser)]
#[command(
    name = "qbreview",
    about = "Spaced-repetition review scheduler for question banks",
    version
)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the data path
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Create or migrate the store
    Init,

    /// Record an answer and reschedule the question
    Answer {
        /// Question id, e.g. 114C05
        question: String,
        /// Question set id (defaults to the question id)
        #[arg(long)]
        set: Option<String>,
        /// none, wrong, difficult, correct, easy (or 0-4)
        #[arg(long)]
        result: AnswerGrade,
        /// Answer date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List reviews that are due
    Due {
        /// Include reviews due up to this date (defaults to today)
        #[arg(long)]
        until: Option<NaiveDate>,
        /// Output format
        #[arg(long, default_value = "plain")]
        format: OutputFormat,
    },

    /// Show every answer recorded for a question
    History {
        /// Question id
        question: String,
    },

    /// Print the whole store, or write it to a file
    Dump {
        /// Backup file to write
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Replace the whole store with a backup
    Load {
        /// Backup file to read
        file: PathBuf,
    },
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing to stderr (stdout carries command output)
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("Error: {:#}", err);
        if let Some(hint) = app::suggestion(&err) {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let app = App::open(cli.config.as_deref(), cli.data).await?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Command::Init => commands::init(&app, &mut out)?,
        Command::Answer {
            question,
            set,
            result,
            date,
        } => {
            let set = set.unwrap_or_else(|| question.clone());
            let date = date.unwrap_or_else(today);
            commands::answer(&app, &question, &set, result, date, &mut out).await?;
        }
        Command::Due { until, format } => {
            let until = until.unwrap_or_else(today);
            commands::due(&app, until, &format, &mut out).await?;
        }
        Command::History { question } => commands::history(&app, &question, &mut out).await?,
        Command::Dump { output } => commands::dump(&app, output.as_deref(), &mut out).await?,
        Command::Load { file } => commands::load(&app, &file, &mut out).await?,
    }

    Ok(())
}
