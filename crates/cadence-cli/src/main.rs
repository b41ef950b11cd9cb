//! Cadence CLI Application
//!
//! Command-line interface for the cadence outreach timeline tool.

mod args;
mod cli;
mod renderer;

use anyhow::{Context as _, Result};
use args::{Args, Commands};
use cadence_core::{DeadlineScheduler, EngineBuilder, SWEEP_INTERVAL};
use clap::Parser;
use cli::Cli;
use log::info;
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args { database_file, no_color, command } = Args::parse();

    let engine = EngineBuilder::new()
        .with_database_path(database_file)
        .build()
        .await
        .context("Failed to initialize engine")?;

    let renderer = TerminalRenderer::new(!no_color);

    info!("Cadence started");

    let cli = Cli::new(engine.clone(), renderer);

    match command {
        Connection { command } => cli.handle_connection_command(command).await,
        Timeline { command } => cli.handle_timeline_command(command).await,
        Stage { command } => cli.handle_stage_command(command).await,
        Settings { command } => cli.handle_settings_command(command).await,
        Deadlines { command } => cli.handle_deadline_command(command).await,
        Watch => {
            println!(
                "Watching response deadlines every {}s; press Ctrl-C to stop.",
                SWEEP_INTERVAL.as_secs()
            );
            let mut scheduler = DeadlineScheduler::new(engine);
            scheduler.start();
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for Ctrl-C")?;
            scheduler.stop();
            Ok(())
        }
        Context(args) => cli.show_context(args).await,
    }
}
