use crate::client::AnalyticsClient;
use crate::config::ViewerConfig;
use crate::locale::Locale;
use crate::model::NONE;
use crate::orchestrator::bootstrap::{self, LocalZone, SelectOption};
use crate::orchestrator::form::FormState;
use crate::orchestrator::{Outcome, Session};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "hh-viewer",
    version,
    about = "Job-vacancy analytics viewer with optional TUI"
)]
pub struct Cli {
    /// Base URL of the analytics backend
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    pub base_url: String,

    /// Print the result as JSON and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Print the result as text and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Print the selector options and exit (combine with --json for JSON)
    #[arg(long)]
    pub list: bool,

    /// Stored snapshot to replay; anything but "none" skips the search fields
    #[arg(long, default_value = NONE)]
    pub stats: String,

    /// Previously used search text (wins over --search-text)
    #[arg(long, default_value = NONE)]
    pub text_select: String,

    /// Free-text search query
    #[arg(long)]
    pub search_text: Option<String>,

    /// Previously used technology (wins over --tech-text)
    #[arg(long, default_value = NONE)]
    pub tech_select: String,

    /// Free-text technology keyword
    #[arg(long)]
    pub tech_text: Option<String>,

    /// Number of vacancies to analyze (1-100)
    #[arg(long, default_value = "20", allow_hyphen_values = true)]
    pub count: String,

    /// Language of messages and labels
    #[arg(long, value_enum, default_value_t = Locale::En)]
    pub locale: Locale,

    /// Export a successful result as JSON
    #[arg(long)]
    pub export_json: Option<std::path::PathBuf>,

    /// Write logs to this file (TUI mode defaults to the local data directory)
    #[arg(long)]
    pub log_file: Option<std::path::PathBuf>,
}

impl Cli {
    pub fn is_one_shot(&self) -> bool {
        self.json || self.text || self.list || cfg!(not(feature = "tui"))
    }
}

/// How a run ended, for the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Done,
    ActionFailed,
}

/// Build the form from CLI arguments.
pub fn build_form(args: &Cli) -> FormState {
    FormState {
        stats_select: args.stats.clone(),
        text_select: args.text_select.clone(),
        text_input: args.search_text.clone().unwrap_or_default(),
        tech_select: args.tech_select.clone(),
        tech_input: args.tech_text.clone().unwrap_or_default(),
        count: args.count.clone(),
    }
}

pub async fn run(args: Cli, zone: Arc<dyn LocalZone>) -> Result<RunStatus> {
    if args.json && args.text {
        return Err(anyhow::anyhow!(
            "--json and --text are mutually exclusive. Pick one output mode."
        ));
    }

    let cfg = ViewerConfig::from_cli(&args);
    tracing::debug!(base_url = %cfg.base_url, locale = ?cfg.locale, "configuration");

    if args.list {
        return run_list(&args, &cfg, &*zone).await;
    }

    if !args.json && !args.text {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args, cfg, zone).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            return run_one_shot(&args, &cfg).await;
        }
    }

    run_one_shot(&args, &cfg).await
}

fn option_lines(title: &str, options: &[SelectOption]) -> Vec<String> {
    let mut lines = vec![format!("{title}:")];
    for o in options {
        if o.label == o.value {
            lines.push(format!("  {}", o.value));
        } else {
            lines.push(format!("  {}  {}", o.value, o.label));
        }
    }
    lines
}

async fn run_list(args: &Cli, cfg: &ViewerConfig, zone: &dyn LocalZone) -> Result<RunStatus> {
    let client = AnalyticsClient::new(cfg)?;
    let (out_tx, out_handle) = spawn_output_writer();

    let options = bootstrap::bootstrap(&client, zone).await;

    if args.json {
        let out = serde_json::to_string_pretty(&options)?;
        let _ = out_tx.send(OutputLine::Stdout(out));
    } else {
        let mut lines = option_lines("Snapshots", &options.stats);
        lines.extend(option_lines("Search texts", &options.texts));
        lines.extend(option_lines("Technologies", &options.techs));
        for line in lines {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
    }

    drop(out_tx);
    let _ = out_handle.await;
    Ok(RunStatus::Done)
}

/// JSON body for a failed one-shot action. The message carries no display prefix.
fn error_body(outcome: Option<&Outcome>, session: &Session, locale: Locale) -> serde_json::Value {
    let message = match outcome {
        Some(Err(e)) => e.message(locale),
        // Rejected before dispatch: the results area holds the bare validation text.
        _ => session.screen.results_lines(locale).join("\n"),
    };
    serde_json::json!({ "error": { "message": message } })
}

/// Fill the form from flags, trigger once, print both display areas.
async fn run_one_shot(args: &Cli, cfg: &ViewerConfig) -> Result<RunStatus> {
    let client = AnalyticsClient::new(cfg)?;
    let (out_tx, out_handle) = spawn_output_writer();
    let mut session = Session::new(build_form(args), cfg.locale);

    let outcome = session.run_once(&client).await;

    if args.json {
        let out = match &outcome {
            Some(Ok(view)) => serde_json::to_string_pretty(view)?,
            _ => serde_json::to_string_pretty(&error_body(outcome.as_ref(), &session, cfg.locale))?,
        };
        let _ = out_tx.send(OutputLine::Stdout(out));
    } else {
        for line in &session.screen.stats {
            let _ = out_tx.send(OutputLine::Stdout(line.clone()));
        }
        if !session.screen.stats.is_empty() {
            let _ = out_tx.send(OutputLine::Stdout(String::new()));
        }
        for line in session.screen.results_lines(cfg.locale) {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
    }

    if let (Some(path), Some(Ok(view))) = (args.export_json.as_deref(), outcome.as_ref()) {
        crate::export::export_json(path, view).context("export result")?;
        let _ = out_tx.send(OutputLine::Stderr(format!("Exported: {}", path.display())));
    }

    drop(out_tx);
    let _ = out_handle.await;

    if session.screen.is_error() {
        Ok(RunStatus::ActionFailed)
    } else {
        Ok(RunStatus::Done)
    }
}
