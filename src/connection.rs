//! Lazy connection lifecycle.

use tracing::debug;

use crate::driver::{
    ConnectionAttributes, ConnectionSpec, DefaultDriver, Driver, DriverConnection,
    SET_NAMES_SCHEMES,
};
use crate::error::SqlAdapterError;
use crate::log::QueryLog;

/// Connection that opens on first use and stays open for the owner's
/// lifetime.
///
/// The first [`ensure_connected`](LazyConnection::ensure_connected) call
/// opens the driver connection, applies the fixed attribute set and, for DSN
/// schemes in the `SET NAMES` allow-list, issues a one-time charset
/// directive. Later calls hand back the live connection unchanged. A failed
/// connect is never retried here; the next call simply tries again from
/// scratch.
pub struct LazyConnection {
    spec: ConnectionSpec,
    driver: Box<dyn Driver>,
    charset: String,
    conn: Option<Box<dyn DriverConnection>>,
}

impl LazyConnection {
    #[must_use]
    pub fn new(spec: ConnectionSpec) -> Self {
        Self::with_driver(spec, Box::new(DefaultDriver))
    }

    #[must_use]
    pub fn with_driver(spec: ConnectionSpec, driver: Box<dyn Driver>) -> Self {
        Self {
            spec,
            driver,
            charset: "utf8".to_string(),
            conn: None,
        }
    }

    #[must_use]
    pub fn spec(&self) -> &ConnectionSpec {
        &self.spec
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Set the charset for the one-time `SET NAMES` directive. Only takes
    /// effect if called before the first connect.
    pub fn set_names(&mut self, charset: impl Into<String>) {
        self.charset = charset.into();
    }

    /// Inject an externally constructed connection, marking the lifecycle
    /// connected. Attribute application and the charset directive are
    /// skipped; the caller owns that setup.
    pub fn set_connection(&mut self, conn: Box<dyn DriverConnection>) {
        self.conn = Some(conn);
    }

    /// Connect on first call; afterwards return the live connection.
    ///
    /// # Errors
    /// Returns `SqlAdapterError::ConnectionError` if the driver cannot
    /// connect, or the driver's error if connection setup statements fail.
    pub fn ensure_connected(
        &mut self,
        log: &mut QueryLog,
    ) -> Result<&mut (dyn DriverConnection + 'static), SqlAdapterError> {
        if self.conn.is_none() {
            debug!(dsn = %self.spec.dsn, "opening database connection");
            let mut conn = self.driver.connect(&self.spec)?;
            conn.apply_attributes(&ConnectionAttributes::default())?;
            if SET_NAMES_SCHEMES.contains(&self.spec.scheme()) {
                let directive = format!("SET NAMES {}", self.charset);
                log.record(&directive);
                conn.execute(&directive)?;
            }
            self.conn = Some(conn);
        }
        self.conn.as_deref_mut().ok_or_else(move || {
            SqlAdapterError::ConnectionError("connection unavailable after connect".to_string())
        })
    }
}
