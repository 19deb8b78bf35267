//! Boundary with the relational store.

use crate::error::Result;
use crate::query::Statement;
use crate::value::Value;
use std::sync::Arc;

/// A result row supporting column lookup by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row; `columns` is usually shared by every row of a result.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Value of `column`, `None` if the row has no such column.
    ///
    /// A SQL null is reported as `Some(&Value::Null)`.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// Executes rendered statements.
///
/// Every call runs exactly one statement on a fresh connection; connection
/// lifecycle, timeouts and cancellation belong to the implementation.
pub trait StatementExecutor: Send + Sync {
    /// Run `statement` against the store identified by `connection`.
    fn execute(&self, connection: &str, statement: &Statement) -> Result<Vec<Row>>;
}

impl<E: StatementExecutor + ?Sized> StatementExecutor for Arc<E> {
    fn execute(&self, connection: &str, statement: &Statement) -> Result<Vec<Row>> {
        (**self).execute(connection, statement)
    }
}
