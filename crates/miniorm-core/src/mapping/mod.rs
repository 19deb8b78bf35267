//! Entity mapping: declarative table/column bindings and the metadata
//! resolved from them.
//!
//! Each entity type supplies its bindings once through [`Entity::mapping`];
//! the [`MetadataResolver`] turns them into an immutable [`EntityMetadata`]
//! that lives for the rest of the process.

mod entity;
mod metadata;
mod resolver;
mod types;

pub use entity::{Entity, EntityMapping, EntityType, FieldMapping};
pub use metadata::{ColumnDef, EntityMetadata};
pub use resolver::{MetadataResolver, MetadataSource};
pub use types::{FieldType, ScalarType};
