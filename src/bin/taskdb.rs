//! Command-line to-do list backed by `PostgreSQL`.
//!
//! Usage:
//!
//! ```text
//! taskdb provision
//! taskdb add "Buy milk"
//! taskdb list [--status STARTED] [--json]
//! taskdb status 1 started
//! taskdb update 1 "Buy oat milk"
//! taskdb delete 1
//! ```
//!
//! Connection settings are read from the environment, after loading an
//! optional `.env` file. Diagnostics go to stderr only when `TASKDB_LOG`
//! enables them.

use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use taskdb::cli::{Cli, ExitStatus, execute, render};
use taskdb::config::AppConfig;
use taskdb::logging;
use tokio::runtime::Builder;

fn main() -> ExitCode {
    // A missing `.env` file is the common case.
    drop(dotenvy::dotenv());
    let cli = Cli::parse();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    // Left unlocked: provisioning logs to stderr from a blocking thread.
    let mut err = io::stderr();

    if let Err(init_err) = logging::init_tracing() {
        drop(writeln!(err, "warning: logging disabled: {init_err}"));
    }

    let status = run(cli, &mut out, &mut err).unwrap_or_else(|io_err| {
        drop(writeln!(err, "{}", render::error_line("writing output", &io_err)));
        ExitStatus::Failure
    });
    ExitCode::from(status)
}

fn run(cli: Cli, out: &mut dyn Write, err: &mut dyn Write) -> io::Result<ExitStatus> {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(config_err) => {
            writeln!(err, "{}", render::error_line("reading configuration", &config_err))?;
            return Ok(ExitStatus::Failure);
        }
    };
    let runtime = Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(execute(cli.command, &config, out, err))
}
