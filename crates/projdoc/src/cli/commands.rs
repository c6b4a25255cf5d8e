//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Project or developer registry commands.
#[derive(Debug, Subcommand)]
pub enum RegistryCommand {
    /// Register a name (an existing entry with the same name is reused)
    Add {
        /// Display name
        name: String,
    },

    /// List registered names alphabetically
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

/// Save command arguments.
#[derive(Debug, Args)]
pub struct SaveCommand {
    /// JSON record to save, or `-` to read from stdin
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Override the record's projectId
    #[arg(short, long)]
    pub project: Option<String>,

    /// Override the record's developerId
    #[arg(short, long)]
    pub developer: Option<String>,

    /// Print the saved record as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Project identifier
    pub project_id: String,

    /// Developer identifier
    pub developer_id: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only records of this project
    #[arg(short, long)]
    pub project: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Report compilation commands.
#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Compile the report for one project
    Project {
        /// Project identifier
        project_id: String,

        /// Display name printed in the title and used for the file name
        #[arg(short, long)]
        name: Option<String>,

        #[command(flatten)]
        delivery: DeliveryArgs,
    },

    /// Compile the report across all projects
    Global {
        #[command(flatten)]
        delivery: DeliveryArgs,
    },
}

impl ReportCommand {
    /// Batch and output options shared by both report kinds.
    #[must_use]
    pub fn delivery(&self) -> &DeliveryArgs {
        match self {
            Self::Project { delivery, .. } | Self::Global { delivery } => delivery,
        }
    }
}

/// Options controlling where a report's inputs come from and where it goes.
#[derive(Debug, Args)]
pub struct DeliveryArgs {
    /// JSON array of client-held records to merge before compiling
    #[arg(short, long, value_name = "FILE")]
    pub batch: Option<PathBuf>,

    /// Write the PDF here instead of the configured output directory
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One identifier per line
    Plain,
    /// Aligned columns
    #[default]
    Table,
    /// JSON output
    Json,
}
