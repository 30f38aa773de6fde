//! taskdb: a command-line task tracker backed by `PostgreSQL`.
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: tasks, statuses, and operation outcomes with no
//!   infrastructure dependencies
//! - **Ports**: the [`task::ports::TaskRepository`] contract
//! - **Adapters**: `PostgreSQL` (Diesel) and in-memory repositories
//!
//! # Modules
//!
//! - [`task`]: task lifecycle domain, ports, adapters, and services
//! - [`provision`]: database creation, baseline schema, and migrations
//! - [`db`]: connection acquisition and SQL quoting helpers
//! - [`config`]: environment-sourced configuration
//! - [`cli`]: command parsing, rendering, and dispatch for the binary
//! - [`logging`]: `tracing` subscriber setup

pub mod cli;
pub mod config;
pub mod db;
pub mod logging;
pub mod provision;
pub mod task;
