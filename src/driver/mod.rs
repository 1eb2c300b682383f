//! The driver boundary: everything engine-specific lives behind the
//! [`Driver`] and [`DriverConnection`] traits, consumed by the adapter as a
//! black box.

use std::collections::HashMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::SqlAdapterError;
use crate::results::ResultSet;
use crate::types::SqlValue;

#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Database engines addressable through a connection spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum DriverKind {
    /// MySQL / MariaDB family
    Mysql,
    /// `PostgreSQL`
    Postgres,
    /// `SQLite`
    Sqlite,
}

/// Driver kinds whose engines accept `SAVEPOINT` statements.
///
/// Extending savepoint-based nesting to a new engine means adding its kind
/// here.
pub const SAVEPOINT_DRIVERS: &[DriverKind] = &[DriverKind::Mysql, DriverKind::Postgres];

/// DSN schemes that receive a one-time `SET NAMES` directive on connect.
pub(crate) const SET_NAMES_SCHEMES: &[&str] = &["mysql", "pgsql"];

impl DriverKind {
    /// Resolve a DSN scheme (`mysql`, `pgsql`, `sqlite`) to a kind.
    #[must_use]
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "mysql" => Some(DriverKind::Mysql),
            "pgsql" => Some(DriverKind::Postgres),
            "sqlite" => Some(DriverKind::Sqlite),
            _ => None,
        }
    }

    /// The DSN scheme naming this kind.
    #[must_use]
    pub fn as_scheme(self) -> &'static str {
        match self {
            DriverKind::Mysql => "mysql",
            DriverKind::Postgres => "pgsql",
            DriverKind::Sqlite => "sqlite",
        }
    }

    /// Whether begin/commit/rollback can be emulated with savepoints on this
    /// engine.
    #[must_use]
    pub fn supports_savepoints(self) -> bool {
        SAVEPOINT_DRIVERS.contains(&self)
    }

    /// The character this engine quotes identifiers with.
    #[must_use]
    pub fn identifier_quote_char(self) -> char {
        match self {
            DriverKind::Mysql => '`',
            DriverKind::Postgres | DriverKind::Sqlite => '"',
        }
    }
}

/// Connection descriptor: an opaque driver-specific DSN plus credentials and
/// driver options.
///
/// Nothing is validated until the first connect; a bad scheme or target only
/// surfaces when the connection is actually needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSpec {
    /// DSN in the form `<scheme>:<rest>`, e.g. `mysql:host=localhost;dbname=app`
    /// or `sqlite:/var/lib/app.db`.
    pub dsn: String,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Driver-specific options, passed through opaquely.
    pub options: HashMap<String, String>,
}

impl ConnectionSpec {
    #[must_use]
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            user: None,
            password: None,
            options: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// The DSN scheme: everything before the first `:`, or the whole string.
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.dsn.split(':').next().unwrap_or(&self.dsn)
    }

    /// The DSN body after the scheme separator.
    #[must_use]
    pub fn rest(&self) -> &str {
        self.dsn
            .split_once(':')
            .map_or("", |(_, rest)| rest)
    }

    /// Resolve the driver kind from the DSN scheme.
    ///
    /// # Errors
    /// Returns `SqlAdapterError::ConfigError` for an unknown scheme.
    pub fn kind(&self) -> Result<DriverKind, SqlAdapterError> {
        DriverKind::from_scheme(self.scheme()).ok_or_else(|| {
            SqlAdapterError::ConfigError(format!("unknown driver scheme '{}'", self.scheme()))
        })
    }
}

/// Fixed attribute set applied to every connection the adapter opens itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionAttributes {
    /// Rows are materialized with column-name access.
    pub associative_rows: bool,
    /// Driver failures surface as errors, never as silent status codes.
    pub strict_errors: bool,
    /// Result sets are fully buffered client-side.
    pub buffered_queries: bool,
}

impl Default for ConnectionAttributes {
    fn default() -> Self {
        Self {
            associative_rows: true,
            strict_errors: true,
            buffered_queries: true,
        }
    }
}

/// A live, synchronous connection to one database.
///
/// Transaction control has dedicated entry points; savepoint statements go
/// through the ordinary [`execute`](DriverConnection::execute) path instead.
pub trait DriverConnection: Send {
    fn kind(&self) -> DriverKind;

    /// Apply the fixed attribute set. Drivers ignore attributes their API
    /// already guarantees.
    ///
    /// # Errors
    /// Returns an error if the driver rejects an attribute.
    fn apply_attributes(&mut self, attrs: &ConnectionAttributes) -> Result<(), SqlAdapterError>;

    /// Run SQL without parameters, returning the affected-row count.
    ///
    /// # Errors
    /// Returns the driver's error if the statement is rejected.
    fn execute(&mut self, sql: &str) -> Result<u64, SqlAdapterError>;

    /// Run a prepared statement with positional parameters, returning the
    /// affected-row count.
    ///
    /// # Errors
    /// Returns the driver's error if preparation or execution fails.
    fn execute_with(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, SqlAdapterError>;

    /// Run a query with positional parameters and materialize all rows.
    ///
    /// # Errors
    /// Returns the driver's error if preparation or execution fails.
    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<ResultSet, SqlAdapterError>;

    /// Start a physical transaction.
    ///
    /// # Errors
    /// Returns the driver's error, e.g. when a transaction is already open on
    /// an engine without nesting support.
    fn begin_transaction(&mut self) -> Result<(), SqlAdapterError>;

    /// Commit the physical transaction.
    ///
    /// # Errors
    /// Returns the driver's error if no transaction is active or the commit
    /// is rejected.
    fn commit(&mut self) -> Result<(), SqlAdapterError>;

    /// Roll back the physical transaction.
    ///
    /// # Errors
    /// Returns the driver's error if no transaction is active.
    fn rollback(&mut self) -> Result<(), SqlAdapterError>;

    /// Quote a scalar as a SQL literal using the engine's native escaping
    /// rules. This is the only escaping primitive in the crate; nothing above
    /// the driver boundary rewrites strings itself.
    ///
    /// # Errors
    /// Returns the driver's error if the engine primitive fails.
    fn quote_literal(&self, value: &SqlValue) -> Result<String, SqlAdapterError>;

    /// Row id generated by the last insert on this connection.
    ///
    /// # Errors
    /// Returns the driver's error if the engine cannot report one.
    fn last_insert_id(&mut self) -> Result<i64, SqlAdapterError>;
}

/// Factory opening connections for a spec.
pub trait Driver: Send {
    /// Open a connection for `spec`.
    ///
    /// # Errors
    /// Returns `SqlAdapterError::ConnectionError` if the underlying connect
    /// fails; the call is never retried.
    fn connect(&self, spec: &ConnectionSpec) -> Result<Box<dyn DriverConnection>, SqlAdapterError>;
}

/// Built-in driver selection by DSN scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDriver;

impl Driver for DefaultDriver {
    fn connect(&self, spec: &ConnectionSpec) -> Result<Box<dyn DriverConnection>, SqlAdapterError> {
        match spec.kind()? {
            #[cfg(feature = "sqlite")]
            DriverKind::Sqlite => Ok(Box::new(sqlite::SqliteConnection::open(spec)?)),
            other => Err(SqlAdapterError::Unimplemented(format!(
                "no built-in synchronous driver for '{}'",
                other.as_scheme()
            ))),
        }
    }
}
