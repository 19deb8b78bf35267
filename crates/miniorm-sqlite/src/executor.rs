//! Statement execution over rusqlite.

use crate::connection;
use crate::error::{Result, SqliteError};
use miniorm_core::{Row, Statement, StatementExecutor, Value};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::ToSql;
use std::sync::Arc;
use tracing::trace;

/// Runs each statement on a fresh SQLite connection.
///
/// Placeholders (`@p0`, `@p1`, ...) are bound as SQLite named parameters,
/// so values never reach the SQL text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteExecutor;

impl SqliteExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Execute `statement` and read every row.
    pub fn query(&self, connection: &str, statement: &Statement) -> Result<Vec<Row>> {
        let conn = connection::open(connection)?;
        let mut stmt = conn.prepare(&statement.sql)?;

        for param in &statement.params {
            if stmt.parameter_index(&param.name)?.is_none() {
                return Err(SqliteError::UnboundParameter(param.name.clone()));
            }
        }

        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
            .into();

        let values: Vec<SqlValue> = statement.params.iter().map(|p| to_sql(&p.value)).collect();
        let named: Vec<(&str, &dyn ToSql)> = statement
            .params
            .iter()
            .zip(&values)
            .map(|(p, v)| (p.name.as_str(), v as &dyn ToSql))
            .collect();

        let mut rows = stmt.query(named.as_slice())?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for (i, column) in columns.iter().enumerate() {
                values.push(from_sql(column, row.get_ref(i)?)?);
            }
            result.push(Row::new(columns.clone(), values));
        }

        trace!(rows = result.len(), "sqlite query finished");
        Ok(result)
    }
}

impl StatementExecutor for SqliteExecutor {
    fn execute(&self, connection: &str, statement: &Statement) -> miniorm_core::Result<Vec<Row>> {
        Ok(self.query(connection, statement)?)
    }
}

/// Convert a parameter value to its SQLite storage class.
pub(crate) fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(*b as i64),
        Value::Int32(i) => SqlValue::Integer(*i as i64),
        Value::Int64(i) => SqlValue::Integer(*i),
        Value::Float64(f) => SqlValue::Real(*f),
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Bytes(b) => SqlValue::Blob(b.clone()),
    }
}

fn from_sql(column: &str, value: ValueRef<'_>) -> Result<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int64(i),
        ValueRef::Real(f) => Value::Float64(f),
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(s) => Value::String(s.to_string()),
            Err(e) => {
                return Err(SqliteError::Column {
                    column: column.to_string(),
                    reason: e.to_string(),
                })
            }
        },
        ValueRef::Blob(bytes) => Value::Bytes(bytes.to_vec()),
    })
}
