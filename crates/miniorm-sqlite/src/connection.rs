//! Connection strings.
//!
//! Accepts a bare path (`miniorm.db`), `:memory:`, or a key/value string
//! such as `Data Source=miniorm.db;Mode=ReadWrite` of which only the data
//! source is used.

use crate::error::{Result, SqliteError};
use rusqlite::Connection;
use tracing::trace;

const DATA_SOURCE_KEYS: [&str; 3] = ["data source", "datasource", "filename"];

/// Extract the database path from `connection`.
pub fn data_source(connection: &str) -> Result<&str> {
    let connection_str = connection.trim();
    if connection_str.is_empty() {
        return Err(SqliteError::connection(connection, "empty connection string"));
    }
    if !connection_str.contains('=') {
        return Ok(connection_str);
    }

    for pair in connection_str.split(';') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        if DATA_SOURCE_KEYS.contains(&key.trim().to_ascii_lowercase().as_str()) {
            let path = value.trim();
            if path.is_empty() {
                return Err(SqliteError::connection(connection, "data source is empty"));
            }
            return Ok(path);
        }
    }

    Err(SqliteError::connection(connection, "no data source given"))
}

/// Open a fresh connection for `connection`.
pub fn open(connection: &str) -> Result<Connection> {
    let path = data_source(connection)?;
    trace!(path, "opening sqlite connection");
    let conn = if path == ":memory:" {
        Connection::open_in_memory()?
    } else {
        Connection::open(path)?
    };
    Ok(conn)
}
