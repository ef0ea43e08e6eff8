// src/main.rs
mod cli;
mod command;
mod config;
mod error;
mod external;
mod gateway;
mod interfaces;
mod render;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use std::io;

use crate::cli::Cli;
use crate::config::{AppConfig, CONFIG_ENV};
use crate::render::Palette;

/// Environment variable holding the log filter, e.g. `IP_LOG=debug`.
const LOG_ENV: &str = "IP_LOG";

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Exits with usage on bad arguments, and handles -v / -h.
    let cli = Cli::parse();
    init_tracing();

    // --- Config path handling ---
    let config_path = match cli.config.as_ref() {
        Some(path) => Some(
            path.to_str()
                .context("Config path contains invalid UTF-8")?
                .to_string(),
        ),
        None => std::env::var(CONFIG_ENV).ok().filter(|p| !p.is_empty()),
    };
    let config = AppConfig::load(config_path.as_deref())?;
    tracing::debug!(?config, "configuration loaded");

    let plan = cli.plan();
    tracing::debug!(?plan, "lookup plan");

    let sections = report::collect(&plan, &config).await;

    let stdout = io::stdout();
    let stderr = io::stderr();
    if plan.json {
        render::render_json(&sections, &mut stdout.lock()).context("Failed to write JSON output")?;
    } else {
        let palette = Palette::detect(plan.pretty);
        render::render_text(&sections, plan.pretty, palette, &mut stdout.lock(), &mut stderr.lock())
            .context("Failed to write output")?;
    }

    // Section failures are reported above; they never change the exit code.
    Ok(())
}
