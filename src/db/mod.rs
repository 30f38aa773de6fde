//! Connection gateway for the task database.
//!
//! Every logical operation acquires its own connection through
//! [`ConnectionGateway`], runs one transaction, and drops the connection when
//! the scope ends. Connections are never pooled.

mod conninfo;
mod gateway;

pub use conninfo::{conninfo_escape, quote_identifier};
pub use gateway::{ConnectionGateway, ConnectionUnavailable};
