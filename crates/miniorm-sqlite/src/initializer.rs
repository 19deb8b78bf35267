//! Database bootstrap: create an entity's table and seed it once.

use crate::connection;
use crate::error::Result;
use crate::executor::to_sql;
use crate::schema::TableBuilder;
use miniorm_core::query::PLACEHOLDER_PREFIX;
use miniorm_core::{Entity, EntityMetadata, Error, MetadataSource, Value};
use rusqlite::types::Value as SqlValue;
use rusqlite::ToSql;
use std::sync::Arc;
use tracing::{debug, info};

/// One seed row: `(field, value)` pairs for the fields to insert.
pub type SeedRow = Vec<(&'static str, Value)>;

/// Creates tables and inserts seed data into empty tables.
#[derive(Debug, Clone)]
pub struct DatabaseInitializer {
    tables: TableBuilder,
}

impl DatabaseInitializer {
    pub fn new(connection: impl Into<String>) -> Self {
        Self {
            tables: TableBuilder::new(connection),
        }
    }

    /// Replace the metadata source.
    pub fn with_resolver(self, metadata: Arc<dyn MetadataSource>) -> Self {
        Self {
            tables: self.tables.with_resolver(metadata),
        }
    }

    /// Create `T`'s table and insert `seed` if the table is empty.
    ///
    /// Returns the number of rows inserted.
    pub fn initialize<T: Entity>(&self, seed: &[SeedRow]) -> Result<usize> {
        let metadata = self.tables.create_table_for::<T>()?;

        let mut conn = connection::open(self.tables.connection())?;
        let existing: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", metadata.table_name()),
            [],
            |row| row.get(0),
        )?;
        if existing > 0 {
            debug!(table = metadata.table_name(), existing, "table already seeded");
            return Ok(0);
        }

        let tx = conn.transaction()?;
        for row in seed {
            let (sql, placeholders, values) = insert_statement(&metadata, row)?;
            let named: Vec<(&str, &dyn ToSql)> = placeholders
                .iter()
                .zip(&values)
                .map(|(p, v)| (p.as_str(), v as &dyn ToSql))
                .collect();
            tx.execute(&sql, named.as_slice())?;
        }
        tx.commit()?;

        info!(table = metadata.table_name(), rows = seed.len(), "seed data inserted");
        Ok(seed.len())
    }

    /// Drop `T`'s table and initialize it again.
    pub fn reset<T: Entity>(&self, seed: &[SeedRow]) -> Result<usize> {
        let metadata = self.tables.metadata::<T>()?;
        self.tables.drop_table(metadata.table_name())?;
        info!(table = metadata.table_name(), "database reset");
        self.initialize::<T>(seed)
    }
}

type Insert = (String, Vec<String>, Vec<SqlValue>);

fn insert_statement(metadata: &EntityMetadata, row: &SeedRow) -> Result<Insert> {
    let mut columns = Vec::with_capacity(row.len());
    let mut placeholders = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len());

    for (i, (field, value)) in row.iter().enumerate() {
        let column = metadata
            .column(field)
            .ok_or_else(|| Error::unmapped_field(metadata.entity_name(), field))?;
        columns.push(column.column.as_str());
        placeholders.push(format!("{}{}", PLACEHOLDER_PREFIX, i));
        values.push(to_sql(value));
    }

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        metadata.table_name(),
        columns.join(", "),
        placeholders.join(", ")
    );
    Ok((sql, placeholders, values))
}
