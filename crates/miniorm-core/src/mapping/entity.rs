//! Entity registration.

use super::types::FieldType;
use crate::value::{CoercionError, FromValue, Value};
use std::any::TypeId;
use std::fmt;

/// A statically-typed record persisted in exactly one table.
///
/// Implementations supply their declarative bindings and a setter table;
/// nothing is discovered at runtime.
///
/// ```rust
/// use miniorm_core::{CoercionError, Entity, EntityMapping, FromValue, Value};
///
/// #[derive(Debug, Default)]
/// struct Person {
///     id: i64,
///     name: String,
/// }
///
/// impl Entity for Person {
///     fn mapping() -> EntityMapping {
///         EntityMapping::table("people")
///             .column::<i64>("id", "id")
///             .column::<String>("name", "name")
///     }
///
///     fn set_field(&mut self, field: &str, value: Value) -> Result<bool, CoercionError> {
///         match field {
///             "id" => self.id = FromValue::from_value(value)?,
///             "name" => self.name = FromValue::from_value(value)?,
///             _ => return Ok(false),
///         }
///         Ok(true)
///     }
/// }
/// ```
pub trait Entity: Default + Send + Sync + 'static {
    /// Declarative table and column bindings, read once per process.
    fn mapping() -> EntityMapping;

    /// Assign `value` to `field`.
    ///
    /// Returns `Ok(false)` when the entity has no field with that name.
    fn set_field(&mut self, field: &str, value: Value) -> Result<bool, CoercionError>;
}

/// Declared bindings of one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMapping {
    /// Table binding, if any.
    pub table: Option<String>,
    /// Fields in declaration order, mapped or not.
    pub fields: Vec<FieldMapping>,
}

/// Binding of a single entity field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    /// Field identifier as used in expressions.
    pub field: String,
    /// Column binding; unmapped fields are not persisted.
    pub column: Option<String>,
    /// Declared field type.
    pub field_type: FieldType,
}

impl EntityMapping {
    /// Start a mapping bound to `table`.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            fields: Vec::new(),
        }
    }

    /// Start a mapping with no table binding.
    pub fn unbound() -> Self {
        Self {
            table: None,
            fields: Vec::new(),
        }
    }

    /// Add a field bound to `column`, typed after the Rust field type.
    pub fn column<T: FromValue>(self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.with_field(FieldMapping {
            field: field.into(),
            column: Some(column.into()),
            field_type: T::field_type(),
        })
    }

    /// Add a field that has no column binding.
    pub fn field<T: FromValue>(self, field: impl Into<String>) -> Self {
        self.with_field(FieldMapping {
            field: field.into(),
            column: None,
            field_type: T::field_type(),
        })
    }

    /// Add a field mapping.
    pub fn with_field(mut self, field: FieldMapping) -> Self {
        self.fields.push(field);
        self
    }
}

/// Identity of an entity type, carried by query handles.
#[derive(Clone, Copy)]
pub struct EntityType {
    id: TypeId,
    name: &'static str,
    mapping: fn() -> EntityMapping,
}

impl EntityType {
    /// The identity of `T`.
    pub fn of<T: Entity>() -> Self {
        let full = std::any::type_name::<T>();
        // Generic arguments carry their own paths; keep only the outer type.
        let base = full.split('<').next().unwrap_or(full);
        Self {
            id: TypeId::of::<T>(),
            name: base.rsplit("::").next().unwrap_or(base),
            mapping: T::mapping,
        }
    }

    /// Type identity used as the metadata cache key.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Short type name used in diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Read the declarative bindings.
    pub fn mapping(&self) -> EntityMapping {
        (self.mapping)()
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EntityType {}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityType").field(&self.name).finish()
    }
}
