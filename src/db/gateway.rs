//! Scoped connection acquisition with configured timeouts.

use super::conninfo_escape;
use crate::config::{ConnectionTimeouts, DatabaseCredentials};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

const APPLICATION_NAME: &str = "taskdb";

/// The database server could not be reached or refused the login.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error(
    "could not connect to database '{database}' at {host}:{port}: {cause} \
     (has `taskdb provision` been run?)"
)]
pub struct ConnectionUnavailable {
    /// Database that was targeted.
    pub database: String,
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Driver-reported cause.
    pub cause: String,
}

/// Opens connections to one database with fixed credentials and timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionGateway {
    credentials: DatabaseCredentials,
    timeouts: ConnectionTimeouts,
}

impl ConnectionGateway {
    /// Creates a gateway for the given database.
    #[must_use]
    pub const fn new(credentials: DatabaseCredentials, timeouts: ConnectionTimeouts) -> Self {
        Self {
            credentials,
            timeouts,
        }
    }

    /// Returns the credentials this gateway connects with.
    #[must_use]
    pub const fn credentials(&self) -> &DatabaseCredentials {
        &self.credentials
    }

    /// Returns the database name this gateway targets.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.credentials.name
    }

    /// Builds the libpq keyword/value connection string.
    ///
    /// Every value is quoted, and the statement timeout is passed as a
    /// server option so it applies to every statement on the connection.
    #[must_use]
    pub fn conninfo(&self) -> String {
        let statement_ms = self.timeouts.statement.as_millis();
        let options = format!("-c statement_timeout={statement_ms}");
        [
            ("host", self.credentials.host.clone()),
            ("port", self.credentials.port.to_string()),
            ("dbname", self.credentials.name.clone()),
            ("user", self.credentials.user.clone()),
            ("password", self.credentials.password().to_owned()),
            ("connect_timeout", self.timeouts.connect.as_secs().to_string()),
            ("application_name", APPLICATION_NAME.to_owned()),
            ("options", options),
        ]
        .iter()
        .map(|(key, value)| format!("{key}={}", conninfo_escape(value)))
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Opens a new connection.
    ///
    /// The connection is not in a transaction, so statements issued on it
    /// run in autocommit mode.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionUnavailable`] when the server cannot be reached or
    /// rejects the login.
    pub fn connect(&self) -> Result<PgConnection, ConnectionUnavailable> {
        debug!(
            database = %self.credentials.name,
            host = %self.credentials.host,
            port = self.credentials.port,
            "opening database connection"
        );
        PgConnection::establish(&self.conninfo()).map_err(|err| {
            warn!(
                database = %self.credentials.name,
                host = %self.credentials.host,
                port = self.credentials.port,
                error = %err,
                "database connection failed"
            );
            ConnectionUnavailable {
                database: self.credentials.name.clone(),
                host: self.credentials.host.clone(),
                port: self.credentials.port,
                cause: single_line(&err.to_string()),
            }
        })
    }

    /// Runs `f` inside one transaction on a freshly acquired connection.
    ///
    /// The transaction commits when `f` returns `Ok` and rolls back
    /// otherwise. The connection is released when this call returns, on every
    /// path.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `f`, a connection failure converted into
    /// `E`, or a transaction-control failure converted into `E`.
    pub fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, E>,
        E: From<ConnectionUnavailable> + From<diesel::result::Error>,
    {
        let mut connection = self.connect()?;
        connection.transaction(f)
    }
}

/// libpq appends hints on indented continuation lines; fold them into one.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
