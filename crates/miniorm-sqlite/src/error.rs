//! Error types for the SQLite layer.

use thiserror::Error;

/// Result alias for SQLite operations.
pub type Result<T> = std::result::Result<T, SqliteError>;

/// Errors raised by the SQLite executor and schema bootstrap.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// The SQLite library reported a failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The connection string could not be interpreted.
    #[error("invalid connection string '{connection}': {reason}")]
    Connection { connection: String, reason: String },

    /// A statement parameter has no matching placeholder.
    #[error("parameter '{0}' does not appear in the statement")]
    UnboundParameter(String),

    /// A column value could not be read back.
    #[error("column '{column}': {reason}")]
    Column { column: String, reason: String },

    /// Query-layer failure, such as missing entity metadata.
    #[error(transparent)]
    Core(#[from] miniorm_core::Error),
}

impl SqliteError {
    pub(crate) fn connection(connection: &str, reason: impl Into<String>) -> Self {
        SqliteError::Connection {
            connection: connection.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<SqliteError> for miniorm_core::Error {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Core(e) => e,
            other => miniorm_core::Error::execution(other),
        }
    }
}
