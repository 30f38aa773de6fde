//! Process configuration sourced from the environment.
//!
//! Configuration is read once at process entry into an [`AppConfig`] and
//! passed by reference to the components that need it. Parsing goes through
//! [`AppConfig::from_lookup`] so tests can supply variables without touching
//! the process environment.

use camino::Utf8PathBuf;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_ADMIN_DATABASE: &str = "postgres";
const DEFAULT_SCHEMA_PATH: &str = "data/schema.sql";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STATEMENT_TIMEOUT_MS: u64 = 30_000;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value '{value}' for {var}: {reason}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Raw value as found in the environment.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Credentials for a single `PostgreSQL` database.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseCredentials {
    /// Database name.
    pub name: String,
    /// Login role.
    pub user: String,
    password: String,
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl DatabaseCredentials {
    /// Creates credentials for the given database.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            name: name.into(),
            user: user.into(),
            password: password.into(),
            host: host.into(),
            port,
        }
    }

    /// Returns the login password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns the same server credentials pointed at another database.
    #[must_use]
    pub fn with_database(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}

impl fmt::Debug for DatabaseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseCredentials")
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

/// Timeouts applied to every database connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionTimeouts {
    /// Maximum time to wait while establishing a connection.
    pub connect: Duration,
    /// Maximum run time of a single statement; zero disables the limit.
    pub statement: Duration,
}

impl Default for ConnectionTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            statement: Duration::from_millis(DEFAULT_STATEMENT_TIMEOUT_MS),
        }
    }
}

/// Fully resolved configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Credentials for the task database.
    pub task_db: DatabaseCredentials,
    /// Credentials for the administrative database used during provisioning.
    ///
    /// `None` when `DEFAULT_DB_USER` is unset; only provisioning needs it.
    pub admin_db: Option<DatabaseCredentials>,
    /// Connection and statement timeouts.
    pub timeouts: ConnectionTimeouts,
    /// Location of the baseline schema script.
    pub schema_path: Utf8PathBuf,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through the supplied variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let task_host = vars.or("TASKDB_HOST", DEFAULT_HOST);
        let task_port = vars.port("TASKDB_PORT")?.unwrap_or(DEFAULT_PORT);
        let task_db = DatabaseCredentials::new(
            vars.required("TASKDB_NAME")?,
            vars.required("TASKDB_USER")?,
            vars.secret("TASKDB_PASSWORD"),
            task_host.clone(),
            task_port,
        );

        let admin_db = match vars.get("DEFAULT_DB_USER") {
            Some(user) => Some(DatabaseCredentials::new(
                vars.or("DEFAULT_DB_NAME", DEFAULT_ADMIN_DATABASE),
                user,
                vars.secret("DEFAULT_DB_PASSWORD"),
                vars.or("DEFAULT_DB_HOST", &task_host),
                vars.port("DEFAULT_DB_PORT")?.unwrap_or(task_port),
            )),
            None => None,
        };

        let timeouts = ConnectionTimeouts {
            connect: vars
                .number("TASKDB_CONNECT_TIMEOUT_SECS")?
                .map_or(ConnectionTimeouts::default().connect, Duration::from_secs),
            statement: vars
                .number("TASKDB_STATEMENT_TIMEOUT_MS")?
                .map_or(ConnectionTimeouts::default().statement, Duration::from_millis),
        };

        Ok(Self {
            task_db,
            admin_db,
            timeouts,
            schema_path: Utf8PathBuf::from(vars.or("TASKDB_SCHEMA_PATH", DEFAULT_SCHEMA_PATH)),
        })
    }

    /// Returns the administrative credentials required for provisioning.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `DEFAULT_DB_USER` was not set.
    pub fn admin_credentials(&self) -> Result<&DatabaseCredentials, ConfigError> {
        self.admin_db
            .as_ref()
            .ok_or(ConfigError::Missing("DEFAULT_DB_USER"))
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, var: &str) -> Option<String> {
        (self.0)(var)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    }

    /// Passwords are taken verbatim; surrounding spaces are significant.
    fn secret(&self, var: &str) -> String {
        (self.0)(var).unwrap_or_default()
    }

    fn or(&self, var: &str, fallback: &str) -> String {
        self.get(var).unwrap_or_else(|| fallback.to_owned())
    }

    fn required(&self, var: &'static str) -> Result<String, ConfigError> {
        self.get(var).ok_or(ConfigError::Missing(var))
    }

    fn port(&self, var: &'static str) -> Result<Option<u16>, ConfigError> {
        self.get(var)
            .map(|value| {
                value.parse::<u16>().map_err(|err| ConfigError::Invalid {
                    var,
                    value: value.clone(),
                    reason: err.to_string(),
                })
            })
            .transpose()
    }

    fn number(&self, var: &'static str) -> Result<Option<u64>, ConfigError> {
        self.get(var)
            .map(|value| {
                value.parse::<u64>().map_err(|err| ConfigError::Invalid {
                    var,
                    value: value.clone(),
                    reason: err.to_string(),
                })
            })
            .transpose()
    }
}
