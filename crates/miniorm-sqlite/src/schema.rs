//! Table creation from entity metadata.

use crate::connection;
use crate::error::Result;
use miniorm_core::{Entity, EntityMetadata, MetadataResolver, MetadataSource, ScalarType};
use std::sync::Arc;
use tracing::info;

/// Name of the field that becomes the table's primary key.
const KEY_FIELD: &str = "id";

/// SQLite column type for a scalar.
pub fn sql_type(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::Bool | ScalarType::Int32 | ScalarType::Int64 => "INTEGER",
        ScalarType::Float64 => "REAL",
        ScalarType::String => "TEXT",
        ScalarType::Bytes => "BLOB",
    }
}

/// Render the `CREATE TABLE IF NOT EXISTS` statement for `metadata`.
///
/// A field named `id` (any case) becomes the primary key; integer keys are
/// autoincremented.
pub fn create_table_sql(metadata: &EntityMetadata) -> String {
    let columns: Vec<String> = metadata
        .columns()
        .iter()
        .map(|c| {
            let ty = sql_type(c.field_type.scalar_type());
            if !c.field.eq_ignore_ascii_case(KEY_FIELD) {
                format!("{} {}", c.column, ty)
            } else if ty == "INTEGER" {
                format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", c.column)
            } else {
                format!("{} {} PRIMARY KEY", c.column, ty)
            }
        })
        .collect();

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        metadata.table_name(),
        columns.join(", ")
    )
}

/// Creates and drops entity tables.
#[derive(Clone)]
pub struct TableBuilder {
    connection: String,
    metadata: Arc<dyn MetadataSource>,
}

impl TableBuilder {
    /// Create a builder for `connection` using the process-wide resolver.
    pub fn new(connection: impl Into<String>) -> Self {
        Self {
            connection: connection.into(),
            metadata: MetadataResolver::global(),
        }
    }

    /// Replace the metadata source.
    pub fn with_resolver(mut self, metadata: Arc<dyn MetadataSource>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    /// Resolve the metadata of `T`.
    pub fn metadata<T: Entity>(&self) -> Result<Arc<EntityMetadata>> {
        Ok(self.metadata.resolve(&miniorm_core::EntityType::of::<T>())?)
    }

    /// Create `T`'s table unless it exists.
    pub fn create_table_for<T: Entity>(&self) -> Result<Arc<EntityMetadata>> {
        let metadata = self.metadata::<T>()?;
        let sql = create_table_sql(&metadata);
        connection::open(&self.connection)?.execute_batch(&sql)?;
        info!(table = metadata.table_name(), "table created or verified");
        Ok(metadata)
    }

    /// Drop `table` if it exists.
    pub fn drop_table(&self, table: &str) -> Result<()> {
        connection::open(&self.connection)?.execute_batch(&format!("DROP TABLE IF EXISTS {}", table))?;
        info!(table, "table dropped");
        Ok(())
    }
}

impl std::fmt::Debug for TableBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableBuilder")
            .field("connection", &self.connection)
            .finish_non_exhaustive()
    }
}
