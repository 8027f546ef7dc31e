mod cli;
mod client;
mod config;
mod error;
mod export;
mod locale;
mod logging;
mod model;
mod orchestrator;
mod render;
#[cfg(feature = "tui")]
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use orchestrator::bootstrap::SystemZone;
use std::sync::Arc;

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let target = match (&args.log_file, args.is_one_shot()) {
        (Some(path), _) => logging::LogTarget::File(path.clone()),
        (None, true) => logging::LogTarget::Stderr,
        (None, false) => logging::LogTarget::File(logging::default_log_file()),
    };
    let log_guard = logging::init(target)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start tokio runtime")?;

    let status = runtime.block_on(cli::run(args, Arc::new(SystemZone)));
    match status {
        Ok(cli::RunStatus::Done) => Ok(()),
        Ok(cli::RunStatus::ActionFailed) => {
            drop(runtime);
            drop(log_guard);
            std::process::exit(1)
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "run failed");
            Err(e)
        }
    }
}
