use thiserror::Error;

/// Errors surfaced by the adapter and its driver boundary.
///
/// Driver failures are wrapped transparently so callers can still match on
/// the underlying error; everything else carries a message describing the
/// misuse or failure.
#[derive(Debug, Error)]
pub enum SqlAdapterError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),

    #[error("Other database error: {0}")]
    Other(String),
}
