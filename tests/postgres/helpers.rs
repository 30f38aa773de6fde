//! Per-test databases on the shared embedded cluster.

pub use super::cluster::{BoxError, ManagedCluster, PostgresCluster, postgres_cluster};
use std::io::Write;
use std::sync::Arc;
use taskdb::db::ConnectionGateway;
use taskdb::provision::{ProvisionReport, SchemaProvisioner, SchemaSource};
use taskdb::task::adapters::postgres::PostgresTaskRepository;
use taskdb::task::services::TaskLifecycleService;
use uuid::Uuid;

/// Baseline schema shipped with the crate.
pub const SCHEMA_SQL: &str = include_str!("../../data/schema.sql");

/// A uniquely named database that is dropped with the guard.
pub struct TestDatabase {
    cluster: &'static ManagedCluster,
    name: String,
}

impl TestDatabase {
    /// Reserves a fresh database name; the database itself is not created.
    #[must_use]
    pub fn reserve(cluster: &'static ManagedCluster, prefix: &str) -> Self {
        Self {
            cluster,
            name: format!("{prefix}_{}", Uuid::new_v4().simple()),
        }
    }

    /// Name of the database.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gateway for this database.
    #[must_use]
    pub fn gateway(&self) -> ConnectionGateway {
        self.cluster.gateway(&self.name)
    }

    /// Provisioner that creates and migrates this database.
    #[must_use]
    pub fn provisioner(&self) -> SchemaProvisioner {
        SchemaProvisioner::new(self.cluster.admin_gateway(), self.gateway())
    }

    /// Runs a full provisioning pass with the shipped schema.
    pub fn provision(&self) -> Result<ProvisionReport, BoxError> {
        let report = self
            .provisioner()
            .provision(&SchemaSource::Script(SCHEMA_SQL.to_owned()))?;
        Ok(report)
    }

    /// Lifecycle service backed by this database.
    #[must_use]
    pub fn service(&self) -> TaskLifecycleService<PostgresTaskRepository> {
        TaskLifecycleService::new(Arc::new(PostgresTaskRepository::new(self.gateway())))
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        if let Err(err) = self.cluster.drop_database(&self.name) {
            drop(writeln!(
                std::io::stderr(),
                "failed to drop test database {}: {err}",
                self.name
            ));
        }
    }
}

/// Reserves and provisions a database on the shared cluster.
pub fn provisioned_database(
    cluster: PostgresCluster,
    prefix: &str,
) -> Result<TestDatabase, BoxError> {
    let database = TestDatabase::reserve(cluster, prefix);
    database.provision()?;
    Ok(database)
}
