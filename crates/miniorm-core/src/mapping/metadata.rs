//! Resolved entity metadata.

use super::entity::EntityType;
use super::types::FieldType;

/// A persisted field and the column it is bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Field identifier.
    pub field: String,
    /// Column name.
    pub column: String,
    /// Declared field type.
    pub field_type: FieldType,
}

/// Immutable table binding of one entity type.
///
/// Only fields with a column binding appear in `columns`; their order is the
/// declaration order and is the default `SELECT` list.
#[derive(Debug, Clone)]
pub struct EntityMetadata {
    entity: EntityType,
    table: String,
    columns: Vec<ColumnDef>,
}

impl EntityMetadata {
    pub(crate) fn new(entity: EntityType, table: String, columns: Vec<ColumnDef>) -> Self {
        Self {
            entity,
            table,
            columns,
        }
    }

    /// The entity type this metadata describes.
    pub fn entity(&self) -> EntityType {
        self.entity
    }

    /// Short entity name for diagnostics.
    pub fn entity_name(&self) -> &'static str {
        self.entity.name()
    }

    /// Table name.
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Mapped columns in declaration order.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Look up the column bound to `field`.
    pub fn column(&self, field: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.field == field)
    }
}
