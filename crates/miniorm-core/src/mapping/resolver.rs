//! Process-wide metadata cache.

use super::entity::{Entity, EntityType};
use super::metadata::{ColumnDef, EntityMetadata};
use crate::error::{Error, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::any::TypeId;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};
use tracing::debug;

static GLOBAL: OnceLock<Arc<MetadataResolver>> = OnceLock::new();

/// Source of entity metadata used by the translator.
pub trait MetadataSource: Send + Sync {
    /// Resolve the metadata of `entity`.
    fn resolve(&self, entity: &EntityType) -> Result<Arc<EntityMetadata>>;
}

/// Build-once, read-many cache of [`EntityMetadata`] keyed by type identity.
///
/// Concurrent first lookups of the same type block on the cache shard while
/// one caller builds, so at most one instance per type is ever visible.
/// Failed builds are not cached: an invalid mapping fails on every call.
#[derive(Debug, Default)]
pub struct MetadataResolver {
    cache: DashMap<TypeId, Arc<EntityMetadata>>,
}

impl MetadataResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// The resolver shared by every context that does not supply its own.
    pub fn global() -> Arc<MetadataResolver> {
        GLOBAL.get_or_init(|| Arc::new(Self::new())).clone()
    }

    /// Resolve the metadata of `T`.
    pub fn resolve_entity<T: Entity>(&self) -> Result<Arc<EntityMetadata>> {
        self.resolve(&EntityType::of::<T>())
    }

    /// Number of cached entity types.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if nothing has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    fn build(entity: &EntityType) -> Result<EntityMetadata> {
        let mapping = entity.mapping();

        let table = match mapping.table {
            Some(t) if !t.trim().is_empty() => t,
            Some(_) => return Err(Error::mapping(entity.name(), "table binding is empty")),
            None => return Err(Error::mapping(entity.name(), "type declares no table binding")),
        };

        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for field in mapping.fields {
            if !seen.insert(field.field.clone()) {
                return Err(Error::mapping(
                    entity.name(),
                    format!("field '{}' is declared more than once", field.field),
                ));
            }
            if let Some(column) = field.column {
                columns.push(ColumnDef {
                    field: field.field,
                    column,
                    field_type: field.field_type,
                });
            }
        }

        if columns.is_empty() {
            return Err(Error::mapping(entity.name(), "type has no column-mapped fields"));
        }

        debug!(
            entity = entity.name(),
            table = %table,
            columns = columns.len(),
            "built entity metadata"
        );

        Ok(EntityMetadata::new(*entity, table, columns))
    }
}

impl MetadataSource for MetadataResolver {
    fn resolve(&self, entity: &EntityType) -> Result<Arc<EntityMetadata>> {
        if let Some(cached) = self.cache.get(&entity.id()) {
            return Ok(cached.clone());
        }

        match self.cache.entry(entity.id()) {
            Entry::Occupied(e) => Ok(e.get().clone()),
            Entry::Vacant(e) => {
                let metadata = Arc::new(Self::build(entity)?);
                e.insert(metadata.clone());
                Ok(metadata)
            }
        }
    }
}
