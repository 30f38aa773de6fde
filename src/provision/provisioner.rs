//! Database creation, baseline schema, and migration application.

use super::ledger;
use super::migrations::{MIGRATIONS, Migration};
use super::{DatabaseStatus, MigrationOutcome, ProvisionError, ProvisionReport, SchemaSource};
use crate::db::{ConnectionGateway, quote_identifier};
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Text};
use thiserror::Error;
use tracing::{info, warn};

/// Creates the task database and brings its schema up to date.
///
/// Administrative statements go through `admin`; schema and migrations are
/// applied through `target`. Every step is safe to repeat.
#[derive(Debug, Clone)]
pub struct SchemaProvisioner {
    admin: ConnectionGateway,
    target: ConnectionGateway,
}

#[derive(diesel::QueryableByName)]
struct ExistsRow {
    #[diesel(sql_type = Bool)]
    exists: bool,
}

/// Failure inside a single migration transaction.
#[derive(Debug, Error)]
enum MigrationStepError {
    #[error(transparent)]
    Connection(#[from] crate::db::ConnectionUnavailable),
    #[error(transparent)]
    Query(#[from] diesel::result::Error),
    #[error("recorded checksum {recorded} differs from {expected}")]
    ChecksumMismatch { recorded: String, expected: String },
}

impl SchemaProvisioner {
    /// Creates a provisioner from administrative and target gateways.
    #[must_use]
    pub const fn new(admin: ConnectionGateway, target: ConnectionGateway) -> Self {
        Self { admin, target }
    }

    /// Returns the gateway for the database being provisioned.
    #[must_use]
    pub const fn target(&self) -> &ConnectionGateway {
        &self.target
    }

    /// Reports whether a database named `name` exists on the server.
    ///
    /// Connection or query failures are logged and treated as "does not
    /// exist"; they are never returned.
    #[must_use]
    pub fn database_exists(&self, name: &str) -> bool {
        let lookup = self.admin.connect().map_err(|err| err.to_string()).and_then(
            |mut connection| {
                diesel::sql_query(
                    "SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1) AS exists",
                )
                .bind::<Text, _>(name)
                .get_result::<ExistsRow>(&mut connection)
                .map_err(|err| err.to_string())
            },
        );
        match lookup {
            Ok(row) => row.exists,
            Err(error) => {
                warn!(database = name, %error, "database existence check failed");
                false
            }
        }
    }

    /// Creates database `name` owned by `owner` unless it already exists.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Connection`] when the administrative
    /// database is unreachable, or [`ProvisionError::CreateDatabase`] when
    /// the server rejects the statement. Failures are not retried.
    pub fn ensure_database(
        &self,
        name: &str,
        owner: &str,
    ) -> Result<DatabaseStatus, ProvisionError> {
        if self.database_exists(name) {
            info!(database = name, "database already exists");
            return Ok(DatabaseStatus::AlreadyExists);
        }

        let mut connection = self.admin.connect()?;
        let statement = format!(
            "CREATE DATABASE {} OWNER {}",
            quote_identifier(name),
            quote_identifier(owner)
        );
        diesel::sql_query(statement)
            .execute(&mut connection)
            .map_err(|source| ProvisionError::CreateDatabase {
                database: name.to_owned(),
                source,
            })?;
        info!(database = name, owner, "database created");
        Ok(DatabaseStatus::Created)
    }

    /// Runs the baseline schema script in one transaction on the target
    /// database.
    ///
    /// The script is loaded before any connection is opened.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::SchemaFileMissing`] when the script cannot
    /// be read, [`ProvisionError::Connection`] when the target is
    /// unreachable, or [`ProvisionError::ApplySchema`] when a statement
    /// fails. A failed script leaves no partial changes behind.
    pub fn apply_schema(&self, source: &SchemaSource) -> Result<(), ProvisionError> {
        let script = source.load()?;
        let mut connection = self.target.connect()?;
        connection
            .transaction(|conn| conn.batch_execute(&script))
            .map_err(|err| ProvisionError::ApplySchema {
                database: self.target.database().to_owned(),
                source: err,
            })?;
        info!(database = self.target.database(), "baseline schema applied");
        Ok(())
    }

    /// Applies one migration in its own transaction.
    ///
    /// A migration already recorded in the ledger with the same checksum is
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::MigrationChecksumMismatch`] when the ledger
    /// holds a different checksum for the version, or
    /// [`ProvisionError::Migration`] when the script fails. Either way the
    /// transaction is rolled back.
    pub fn apply_migration(
        &self,
        migration: &Migration,
    ) -> Result<MigrationOutcome, ProvisionError> {
        let expected = migration.checksum();
        let outcome = self
            .target
            .transaction(|connection| run_migration(connection, migration, &expected))
            .map_err(|err| match err {
                MigrationStepError::Connection(unavailable) => {
                    ProvisionError::Connection(unavailable)
                }
                MigrationStepError::Query(source) => ProvisionError::Migration {
                    version: migration.version,
                    name: migration.name,
                    source,
                },
                MigrationStepError::ChecksumMismatch { recorded, expected } => {
                    ProvisionError::MigrationChecksumMismatch {
                        version: migration.version,
                        name: migration.name,
                        recorded,
                        expected,
                    }
                }
            })?;
        info!(
            version = migration.version,
            name = migration.name,
            ?outcome,
            "migration processed"
        );
        Ok(outcome)
    }

    /// Applies `migrations` in ascending version order.
    ///
    /// The first failure aborts the sequence; migrations applied before it
    /// stay committed.
    ///
    /// # Errors
    ///
    /// Returns the error of the first migration that fails.
    pub fn apply_migrations(
        &self,
        migrations: &[Migration],
    ) -> Result<Vec<(Migration, MigrationOutcome)>, ProvisionError> {
        let mut ordered = migrations.to_vec();
        ordered.sort_by_key(|migration| migration.version);
        ordered
            .into_iter()
            .map(|migration| {
                self.apply_migration(&migration)
                    .map(|outcome| (migration, outcome))
            })
            .collect()
    }

    /// Creates the target database if needed, then applies the baseline
    /// schema and every registered migration.
    ///
    /// The schema script is read first, so a missing file aborts before any
    /// database is touched. The database is created by the administrative
    /// user and owned by the target user. The schema is not touched when
    /// creation fails.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProvisionError`] encountered.
    pub fn provision(&self, source: &SchemaSource) -> Result<ProvisionReport, ProvisionError> {
        let script = SchemaSource::Script(source.load()?);
        let credentials = self.target.credentials();
        let database = self.ensure_database(&credentials.name, &credentials.user)?;
        self.apply_schema(&script)?;
        let outcomes = self.apply_migrations(MIGRATIONS)?;

        let (applied, skipped): (Vec<_>, Vec<_>) = outcomes
            .into_iter()
            .partition(|(_, outcome)| *outcome == MigrationOutcome::Applied);
        let report = ProvisionReport {
            database,
            migrations_applied: versions(applied),
            migrations_skipped: versions(skipped),
        };
        info!(
            database = %credentials.name,
            applied = report.migrations_applied.len(),
            skipped = report.migrations_skipped.len(),
            "provisioning finished"
        );
        Ok(report)
    }
}

fn run_migration(
    connection: &mut PgConnection,
    migration: &Migration,
    expected: &str,
) -> Result<MigrationOutcome, MigrationStepError> {
    ledger::ensure(connection)?;
    match ledger::recorded_checksum(connection, migration)? {
        Some(recorded) if recorded == expected => Ok(MigrationOutcome::Skipped),
        Some(recorded) => Err(MigrationStepError::ChecksumMismatch {
            recorded,
            expected: expected.to_owned(),
        }),
        None => {
            connection.batch_execute(migration.sql)?;
            ledger::record(connection, migration, expected)?;
            Ok(MigrationOutcome::Applied)
        }
    }
}

fn versions(outcomes: Vec<(Migration, MigrationOutcome)>) -> Vec<i32> {
    outcomes
        .into_iter()
        .map(|(migration, _)| migration.version)
        .collect()
}
