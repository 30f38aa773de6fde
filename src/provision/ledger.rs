//! Migration ledger persisted in the target database.

use super::migrations::Migration;
use diesel::connection::SimpleConnection;
use diesel::dsl::now;
use diesel::pg::PgConnection;
use diesel::prelude::*;

const CREATE_LEDGER_SQL: &str = concat!(
    "CREATE TABLE IF NOT EXISTS schema_migrations (",
    "version INTEGER PRIMARY KEY, ",
    "name TEXT NOT NULL, ",
    "checksum TEXT NOT NULL, ",
    "applied_at TIMESTAMPTZ NOT NULL DEFAULT now())",
);

diesel::table! {
    schema_migrations (version) {
        version -> Int4,
        name -> Text,
        checksum -> Text,
        applied_at -> Timestamptz,
    }
}

/// Creates the ledger relation when it does not exist yet.
pub(super) fn ensure(connection: &mut PgConnection) -> QueryResult<()> {
    connection.batch_execute(CREATE_LEDGER_SQL)
}

/// Returns the checksum recorded for `migration`, if it has been applied.
pub(super) fn recorded_checksum(
    connection: &mut PgConnection,
    migration: &Migration,
) -> QueryResult<Option<String>> {
    schema_migrations::table
        .find(migration.version)
        .select(schema_migrations::checksum)
        .first::<String>(connection)
        .optional()
}

/// Records `migration` as applied with the given checksum.
pub(super) fn record(
    connection: &mut PgConnection,
    migration: &Migration,
    checksum: &str,
) -> QueryResult<()> {
    diesel::insert_into(schema_migrations::table)
        .values((
            schema_migrations::version.eq(migration.version),
            schema_migrations::name.eq(migration.name),
            schema_migrations::checksum.eq(checksum),
            schema_migrations::applied_at.eq(now),
        ))
        .execute(connection)?;
    Ok(())
}
