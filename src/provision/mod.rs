//! Schema provisioning for the task database.
//!
//! Provisioning creates the database when it is missing, applies the
//! baseline schema script, and then runs the compiled-in [`migrations`] in
//! order. Each migration is recorded in a ledger table so re-running
//! provisioning against a live database is a no-op.

mod ledger;
pub mod migrations;
mod provisioner;
mod schema;

use crate::db::ConnectionUnavailable;
use camino::Utf8PathBuf;
use thiserror::Error;

pub use migrations::{MIGRATIONS, Migration};
pub use provisioner::SchemaProvisioner;
pub use schema::SchemaSource;

/// Whether [`SchemaProvisioner::ensure_database`] had to create the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseStatus {
    /// The database was already present; nothing was done.
    AlreadyExists,
    /// The database was created.
    Created,
}

/// What happened to a single migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The script ran and the ledger row was written.
    Applied,
    /// The ledger already recorded the migration with a matching checksum.
    Skipped,
}

/// Summary of a full provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Whether the database was created during this run.
    pub database: DatabaseStatus,
    /// Versions applied during this run, ascending.
    pub migrations_applied: Vec<i32>,
    /// Versions already recorded in the ledger, ascending.
    pub migrations_skipped: Vec<i32>,
}

/// Errors raised while provisioning.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The baseline schema script could not be read.
    #[error("schema file '{path}' could not be read: {source}")]
    SchemaFileMissing {
        /// Path that was tried.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A database server could not be reached.
    #[error(transparent)]
    Connection(#[from] ConnectionUnavailable),

    /// `CREATE DATABASE` was rejected.
    #[error("failed to create database '{database}': {source}")]
    CreateDatabase {
        /// Database that was being created.
        database: String,
        /// Driver-reported failure.
        #[source]
        source: diesel::result::Error,
    },

    /// The baseline schema script failed and was rolled back.
    #[error("failed to apply schema to database '{database}': {source}")]
    ApplySchema {
        /// Target database.
        database: String,
        /// Driver-reported failure.
        #[source]
        source: diesel::result::Error,
    },

    /// A migration script failed and was rolled back.
    #[error("migration {version} ({name}) failed: {source}")]
    Migration {
        /// Migration version.
        version: i32,
        /// Migration name.
        name: &'static str,
        /// Driver-reported failure.
        #[source]
        source: diesel::result::Error,
    },

    /// The ledger holds a different checksum for an applied migration.
    #[error(
        "migration {version} ({name}) was applied with checksum {recorded}, \
         but this build carries {expected}"
    )]
    MigrationChecksumMismatch {
        /// Migration version.
        version: i32,
        /// Migration name.
        name: &'static str,
        /// Checksum stored in the ledger.
        recorded: String,
        /// Checksum of the compiled-in script.
        expected: String,
    },
}
