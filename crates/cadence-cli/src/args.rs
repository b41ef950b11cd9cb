use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{
    ConnectionCommands, ContextArgs, DeadlineCommands, SettingsCommands, StageCommands,
    TimelineCommands,
};

/// Main command-line interface for the Cadence outreach tracking tool
///
/// Cadence tracks outreach relationships ("connections") through their
/// communication stages. Each connection carries an ordered timeline of
/// first-impression, response and follow-up stages; sending a message
/// starts a response window, and a background watcher escalates stages
/// whose window lapses.
#[derive(Parser)]
#[command(version, about, name = "cadence")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/cadence/cadence.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the Cadence CLI
///
/// The CLI is organized around the domain objects:
/// - `connection`: seed and inspect connection records
/// - `timeline`: initialize and view a connection's stage timeline
/// - `stage`: drive stage status transitions and manual advancement
/// - `settings`: adjust the per-connection response wait window
/// - `deadlines`: run one deadline sweep by hand
/// - `watch`: run the recurring deadline sweep until interrupted
/// - `context`: derive the messaging context for a connection
#[derive(Subcommand)]
pub enum Commands {
    /// Manage connections
    #[command(alias = "c")]
    Connection {
        #[command(subcommand)]
        command: ConnectionCommands,
    },
    /// Manage a connection's timeline
    #[command(alias = "t")]
    Timeline {
        #[command(subcommand)]
        command: TimelineCommands,
    },
    /// Manage stages within a timeline
    #[command(alias = "s")]
    Stage {
        #[command(subcommand)]
        command: StageCommands,
    },
    /// Manage per-connection settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Inspect response deadlines
    #[command(alias = "d")]
    Deadlines {
        #[command(subcommand)]
        command: DeadlineCommands,
    },
    /// Run the recurring deadline sweep until interrupted
    Watch,
    /// Derive the messaging context for a connection as JSON
    Context(ContextArgs),
}
