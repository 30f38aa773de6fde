//! Task lifecycle management.
//!
//! Tasks are stored one per row, keyed by a database-assigned identifier,
//! and move between the `NOT_STARTED`, `STARTED`, and `COMPLETED` statuses
//! without any enforced ordering. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
