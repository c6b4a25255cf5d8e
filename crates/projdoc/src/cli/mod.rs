//! Command-line interface for projdoc.
//!
//! This module provides the CLI structure for the `projdoc` binary. Handlers
//! live in `main.rs`.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DeliveryArgs, ListCommand, OutputFormat, RegistryCommand, ReportCommand,
    SaveCommand, ShowCommand, StatusCommand,
};

/// projdoc - Per-contributor project documentation
///
/// Saves one documentation record per (project, developer) pair and compiles
/// them into PDF reports for a single project or the whole system.
#[derive(Debug, Parser)]
#[command(name = "projdoc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the project registry
    #[command(subcommand)]
    Project(RegistryCommand),

    /// Manage the developer registry
    #[command(subcommand)]
    Developer(RegistryCommand),

    /// Create or update a documentation record
    Save(SaveCommand),

    /// Show the record for a project and developer
    Show(ShowCommand),

    /// List documentation records
    List(ListCommand),

    /// Compile a PDF report
    #[command(subcommand)]
    Report(ReportCommand),

    /// Show store status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}
