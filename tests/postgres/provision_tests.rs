//! Provisioning tests: database creation, baseline schema, and migrations.

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};
use rstest::rstest;
use taskdb::provision::{
    DatabaseStatus, MIGRATIONS, MigrationOutcome, ProvisionError, SchemaSource,
};
use taskdb::task::domain::{Task, TaskStatus};

use crate::postgres::helpers::{
    BoxError, PostgresCluster, SCHEMA_SQL, TestDatabase, postgres_cluster,
};

#[derive(QueryableByName, Debug, PartialEq, Eq)]
struct LedgerRow {
    #[diesel(sql_type = diesel::sql_types::Integer)]
    version: i32,
    #[diesel(sql_type = Text)]
    checksum: String,
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

#[derive(QueryableByName, Debug, PartialEq, Eq)]
struct ColumnRow {
    #[diesel(sql_type = Text)]
    column_name: String,
    #[diesel(sql_type = Text)]
    is_nullable: String,
}

fn ledger(database: &TestDatabase) -> Result<Vec<LedgerRow>, BoxError> {
    let mut connection = database.gateway().connect()?;
    let rows = diesel::sql_query(
        "SELECT version, checksum FROM schema_migrations ORDER BY version",
    )
    .load::<LedgerRow>(&mut connection)?;
    Ok(rows)
}

fn task_columns(database: &TestDatabase) -> Result<Vec<ColumnRow>, BoxError> {
    let mut connection = database.gateway().connect()?;
    let rows = diesel::sql_query(concat!(
        "SELECT column_name::text AS column_name, is_nullable::text AS is_nullable ",
        "FROM information_schema.columns ",
        "WHERE table_name = 'tasks' ORDER BY ordinal_position",
    ))
    .load::<ColumnRow>(&mut connection)?;
    Ok(rows)
}

#[rstest]
fn provisioning_creates_database_and_applies_every_migration(
    postgres_cluster: PostgresCluster,
) -> Result<(), BoxError> {
    let database = TestDatabase::reserve(postgres_cluster, "provision");
    let provisioner = database.provisioner();
    assert!(!provisioner.database_exists(database.name()));

    let report = database.provision()?;

    assert_eq!(report.database, DatabaseStatus::Created);
    assert_eq!(report.migrations_applied, vec![1, 2]);
    assert!(report.migrations_skipped.is_empty());
    assert!(provisioner.database_exists(database.name()));
    let columns: Vec<(String, String)> = task_columns(&database)?
        .into_iter()
        .map(|row| (row.column_name, row.is_nullable))
        .collect();
    assert_eq!(
        columns,
        vec![
            ("task_id".to_owned(), "NO".to_owned()),
            ("description".to_owned(), "NO".to_owned()),
            ("status".to_owned(), "YES".to_owned()),
            ("created_at".to_owned(), "NO".to_owned()),
            ("status_changed_at".to_owned(), "YES".to_owned()),
        ]
    );
    Ok(())
}

#[rstest]
fn provisioning_twice_is_a_no_op(postgres_cluster: PostgresCluster) -> Result<(), BoxError> {
    let database = TestDatabase::reserve(postgres_cluster, "reprovision");
    database.provision()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let service = database.service();
    let tasks_before: Vec<Task> = runtime.block_on(async {
        service.add_task("Buy milk").await?;
        let started = service.add_task("Paint fence").await?;
        service.set_status(started.id(), "STARTED").await?;
        let listed = service.list_tasks(None).await?;
        Ok::<_, BoxError>(listed.collect())
    })?;
    let ledger_before = ledger(&database)?;
    let columns_before = task_columns(&database)?;

    let second = database.provision()?;

    assert_eq!(second.database, DatabaseStatus::AlreadyExists);
    assert!(second.migrations_applied.is_empty());
    assert_eq!(second.migrations_skipped, vec![1, 2]);
    assert_eq!(ledger(&database)?, ledger_before);
    assert_eq!(task_columns(&database)?, columns_before);
    let tasks_after: Vec<Task> = runtime
        .block_on(service.list_tasks(None))?
        .collect();
    assert_eq!(tasks_after, tasks_before);
    let [untouched, started] = tasks_after.as_slice() else {
        panic!("expected two tasks, got {tasks_after:?}");
    };
    assert_eq!(untouched.status(), Some(TaskStatus::NotStarted));
    assert_eq!(untouched.status_changed_at(), None);
    assert_eq!(started.status(), Some(TaskStatus::Started));
    assert!(started.status_changed_at().is_some());
    Ok(())
}

#[rstest]
fn ledger_records_script_checksums(postgres_cluster: PostgresCluster) -> Result<(), BoxError> {
    let database = TestDatabase::reserve(postgres_cluster, "ledger");
    database.provision()?;

    let recorded = ledger(&database)?;

    let expected: Vec<LedgerRow> = MIGRATIONS
        .iter()
        .map(|migration| LedgerRow {
            version: migration.version,
            checksum: migration.checksum(),
        })
        .collect();
    assert_eq!(recorded, expected);
    Ok(())
}

#[rstest]
fn tampered_ledger_checksum_aborts_provisioning(
    postgres_cluster: PostgresCluster,
) -> Result<(), BoxError> {
    let database = TestDatabase::reserve(postgres_cluster, "tampered");
    database.provision()?;
    let mut connection = database.gateway().connect()?;
    diesel::sql_query("UPDATE schema_migrations SET checksum = 'bogus' WHERE version = 1")
        .execute(&mut connection)?;
    drop(connection);

    let result = database.provision();

    let err = result.expect_err("mismatched checksum should abort provisioning");
    let provision_err = err
        .downcast_ref::<ProvisionError>()
        .expect("provisioning error");
    assert!(matches!(
        provision_err,
        ProvisionError::MigrationChecksumMismatch { version: 1, recorded, .. } if recorded == "bogus"
    ));
    Ok(())
}

#[rstest]
fn migrations_backfill_rows_from_older_schema(
    postgres_cluster: PostgresCluster,
) -> Result<(), BoxError> {
    let database = TestDatabase::reserve(postgres_cluster, "legacy");
    let provisioner = database.provisioner();
    let owner = postgres_cluster.credentials("postgres").user;
    provisioner.ensure_database(database.name(), &owner)?;
    provisioner.apply_schema(&SchemaSource::Script(SCHEMA_SQL.to_owned()))?;
    let mut connection = database.gateway().connect()?;
    diesel::sql_query("INSERT INTO tasks (description) VALUES ('Legacy row')")
        .execute(&mut connection)?;
    drop(connection);

    let outcomes = provisioner.apply_migrations(MIGRATIONS)?;

    assert!(
        outcomes
            .iter()
            .all(|(_, outcome)| *outcome == MigrationOutcome::Applied)
    );
    let service = database.service();
    let tasks: Vec<_> = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(service.list_tasks(None))?
        .collect();
    let [legacy] = tasks.as_slice() else {
        panic!("expected exactly one task, got {tasks:?}");
    };
    assert_eq!(legacy.status(), Some(TaskStatus::NotStarted));
    assert_eq!(
        legacy.created_at().to_rfc3339(),
        "2025-01-01T12:00:00+00:00"
    );
    assert_eq!(legacy.status_changed_at(), None);
    Ok(())
}

#[rstest]
fn status_check_constraint_rejects_unknown_values(
    postgres_cluster: PostgresCluster,
) -> Result<(), BoxError> {
    let database = TestDatabase::reserve(postgres_cluster, "constraint");
    database.provision()?;
    let mut connection = database.gateway().connect()?;

    let rejected = diesel::sql_query(
        "INSERT INTO tasks (description, status) VALUES ('Bad status', 'DONE')",
    )
    .execute(&mut connection);
    let count = diesel::sql_query("SELECT count(*) AS count FROM tasks")
        .get_result::<CountRow>(&mut connection)?;

    assert!(rejected.is_err());
    assert_eq!(count.count, 0);
    Ok(())
}

#[rstest]
fn failing_schema_script_is_rolled_back(
    postgres_cluster: PostgresCluster,
) -> Result<(), BoxError> {
    let database = TestDatabase::reserve(postgres_cluster, "rollback");
    let provisioner = database.provisioner();
    let owner = postgres_cluster.credentials("postgres").user;
    provisioner.ensure_database(database.name(), &owner)?;

    let result = provisioner.apply_schema(&SchemaSource::Script(
        "CREATE TABLE partial (id INTEGER); SELECT * FROM missing_relation;".to_owned(),
    ));

    assert!(matches!(result, Err(ProvisionError::ApplySchema { .. })));
    let mut connection = database.gateway().connect()?;
    let count = diesel::sql_query(
        "SELECT count(*) AS count FROM information_schema.tables WHERE table_name = 'partial'",
    )
    .get_result::<CountRow>(&mut connection)?;
    assert_eq!(count.count, 0);
    Ok(())
}

#[rstest]
fn missing_schema_file_is_reported_before_connecting(
    postgres_cluster: PostgresCluster,
) -> Result<(), BoxError> {
    let database = TestDatabase::reserve(postgres_cluster, "noschema");

    let provisioner = database.provisioner();

    let result = provisioner.provision(&SchemaSource::File("no/such/schema.sql".into()));

    assert!(matches!(
        result,
        Err(ProvisionError::SchemaFileMissing { .. })
    ));
    assert!(!provisioner.database_exists(database.name()));
    Ok(())
}
