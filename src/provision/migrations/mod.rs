//! Compiled-in migration registry.
//!
//! Every script is additive and idempotent: columns and constraints are only
//! added when absent, and backfills only touch rows that are still null.
//! Versions are strictly ascending and must never be renumbered once
//! released, because the ledger records them.

use sha2::{Digest, Sha256};

/// One schema migration script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    /// Position in the apply order; recorded in the ledger.
    pub version: i32,
    /// Short descriptive name.
    pub name: &'static str,
    /// SQL script run verbatim.
    pub sql: &'static str,
}

impl Migration {
    /// Returns the hex-encoded SHA-256 digest of the script.
    #[must_use]
    pub fn checksum(&self) -> String {
        hex::encode(Sha256::digest(self.sql.as_bytes()))
    }
}

/// Migrations known to this binary, in apply order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "add_task_status",
        sql: include_str!("0001_add_task_status.sql"),
    },
    Migration {
        version: 2,
        name: "add_task_timestamps",
        sql: include_str!("0002_add_task_timestamps.sql"),
    },
];
