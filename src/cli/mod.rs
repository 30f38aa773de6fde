//! Command-line surface of the `taskdb` binary.
//!
//! Argument parsing lives in this module, rendering in [`render`], and the
//! mapping from commands to service calls and exit statuses in
//! [`dispatch`].

pub mod dispatch;
pub mod render;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

pub use dispatch::{ExitStatus, execute, run_provision, run_task_command};

/// Top-level arguments.
#[derive(Debug, Parser)]
#[command(
    name = "taskdb",
    version,
    about = "A command-line to-do list that tracks task status in PostgreSQL."
)]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Every command the binary accepts.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Task store commands.
    #[command(flatten)]
    Task(TaskCommand),

    /// Create the task database if needed and bring its schema up to date.
    Provision(ProvisionArgs),
}

/// Commands that read or change tasks.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum TaskCommand {
    /// List tasks, optionally only those with one status.
    #[command(alias = "lall")]
    List {
        /// Only list tasks with this status.
        #[arg(long)]
        status: Option<String>,
        /// Output options.
        #[command(flatten)]
        format: ListFormat,
    },

    /// List started tasks.
    #[command(alias = "s")]
    Started(ListFormat),

    /// List completed tasks.
    #[command(alias = "c")]
    Completed(ListFormat),

    /// List tasks that have not been started.
    #[command(alias = "n")]
    NotStarted(ListFormat),

    /// Add a task.
    Add {
        /// Description of the task, quoted if it contains spaces.
        #[arg(allow_hyphen_values = true)]
        description: String,
    },

    /// Delete a task.
    Delete {
        /// Number of the task to delete.
        task_id: String,
    },

    /// Set the status of a task.
    Status {
        /// Number of the task to change.
        task_id: String,
        /// New status: `NOT_STARTED`, `STARTED`, or `COMPLETED`.
        status: String,
    },

    /// Replace the description of a task.
    Update {
        /// Number of the task to change.
        task_id: String,
        /// New description, quoted if it contains spaces.
        #[arg(allow_hyphen_values = true)]
        description: String,
    },
}

/// Output options shared by listing commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Args)]
pub struct ListFormat {
    /// Print one JSON object per task instead of text lines.
    #[arg(long)]
    pub json: bool,
}

/// Options for `provision`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct ProvisionArgs {
    /// Baseline schema script; defaults to `TASKDB_SCHEMA_PATH`.
    #[arg(long)]
    pub schema: Option<Utf8PathBuf>,
}
