//! Conversion of result rows into typed values.

use super::translator::{OutputShape, QueryPlan, Selection};
use crate::error::{Error, Result};
use crate::executor::Row;
use crate::mapping::Entity;
use crate::value::{CoercionError, FromValue, Value};

/// Positional constructor for projection outputs.
///
/// Implemented for scalar field types (one value) and for tuples of up to
/// eight values. Record structs implement it by hand:
///
/// ```rust
/// use miniorm_core::{CoercionError, FromRecord, FromValue, Value};
///
/// struct NameAndAge {
///     name: String,
///     age: i32,
/// }
///
/// impl FromRecord for NameAndAge {
///     const ARITY: usize = 2;
///
///     fn from_record(values: Vec<Value>) -> Result<Self, CoercionError> {
///         let mut values = values.into_iter();
///         Ok(Self {
///             name: FromValue::from_value(values.next().unwrap_or(Value::Null))?,
///             age: FromValue::from_value(values.next().unwrap_or(Value::Null))?,
///         })
///     }
/// }
/// ```
pub trait FromRecord: Sized {
    /// Number of values the constructor takes.
    const ARITY: usize;

    /// Build the value from `ARITY` coerced values in projection order.
    fn from_record(values: Vec<Value>) -> Result<Self, CoercionError>;
}

macro_rules! impl_from_record_scalar {
    ($($ty:ty),*) => {
        $(
            impl FromRecord for $ty {
                const ARITY: usize = 1;

                fn from_record(values: Vec<Value>) -> Result<Self, CoercionError> {
                    <$ty>::from_value(values.into_iter().next().unwrap_or(Value::Null))
                }
            }
        )*
    };
}

impl_from_record_scalar!(bool, i32, i64, f64, String, Vec<u8>);

impl<T: FromValue> FromRecord for Option<T> {
    const ARITY: usize = 1;

    fn from_record(values: Vec<Value>) -> Result<Self, CoercionError> {
        Self::from_value(values.into_iter().next().unwrap_or(Value::Null))
    }
}

macro_rules! impl_from_record_tuple {
    ($arity:expr; $($name:ident),+) => {
        impl<$($name: FromValue),+> FromRecord for ($($name,)+) {
            const ARITY: usize = $arity;

            fn from_record(values: Vec<Value>) -> Result<Self, CoercionError> {
                let mut values = values.into_iter();
                Ok(($($name::from_value(values.next().unwrap_or(Value::Null))?,)+))
            }
        }
    };
}

impl_from_record_tuple!(1; A);
impl_from_record_tuple!(2; A, B);
impl_from_record_tuple!(3; A, B, C);
impl_from_record_tuple!(4; A, B, C, D);
impl_from_record_tuple!(5; A, B, C, D, E);
impl_from_record_tuple!(6; A, B, C, D, E, F);
impl_from_record_tuple!(7; A, B, C, D, E, F, G);
impl_from_record_tuple!(8; A, B, C, D, E, F, G, H);

/// Read the value selected by `selection` and coerce it to the field type.
fn read(row: &Row, selection: &Selection, entity: &str) -> Result<Value> {
    let raw = row.get(&selection.column).ok_or_else(|| {
        Error::materialization(
            entity,
            format!("row has no column '{}'", selection.column),
        )
    })?;
    raw.clone()
        .coerce(selection.field_type.scalar_type())
        .map_err(|e| Error::coercion(entity, &selection.field, e))
}

/// Build a `T` from `row` by assigning every selected field.
///
/// A null in a non-nullable field leaves the field at its default value.
pub fn materialize_entity<T: Entity>(row: &Row, plan: &QueryPlan) -> Result<T> {
    let entity = plan.entity_name();
    if plan.shape != OutputShape::Entity {
        return Err(Error::materialization(entity, "plan does not produce entities"));
    }

    let mut instance = T::default();
    for selection in &plan.selection {
        let value = read(row, selection, entity)?;
        if value.is_null() && !selection.field_type.is_nullable() {
            continue;
        }
        let assigned = instance
            .set_field(&selection.field, value)
            .map_err(|e| Error::coercion(entity, &selection.field, e))?;
        if !assigned {
            return Err(Error::materialization(
                entity,
                format!("no setter for field '{}'", selection.field),
            ));
        }
    }
    Ok(instance)
}

/// Build a projection value positionally from `row`.
pub fn materialize_record<R: FromRecord>(row: &Row, plan: &QueryPlan) -> Result<R> {
    let entity = plan.entity_name();
    if plan.shape == OutputShape::Entity {
        return Err(Error::materialization(entity, "plan produces entities, not projections"));
    }
    if R::ARITY != plan.selection.len() {
        return Err(Error::materialization(
            entity,
            format!(
                "no constructor of {} taking {} value(s)",
                std::any::type_name::<R>(),
                plan.selection.len()
            ),
        ));
    }

    let values = plan
        .selection
        .iter()
        .map(|s| read(row, s, entity))
        .collect::<Result<Vec<_>>>()?;
    R::from_record(values).map_err(|e| Error::materialization(entity, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{field, record};
    use crate::mapping::{EntityMapping, EntityType, MetadataResolver};
    use crate::query::operator::{Operator, OperatorNode};
    use crate::query::translator::Translator;
    use std::sync::Arc;

    #[derive(Debug, Default, PartialEq)]
    struct Person {
        id: i64,
        name: String,
        age: i32,
        email: Option<String>,
    }

    impl Entity for Person {
        fn mapping() -> EntityMapping {
            EntityMapping::table("people")
                .column::<i64>("id", "id")
                .column::<String>("name", "name")
                .column::<i32>("age", "age")
                .column::<Option<String>>("email", "email")
        }

        fn set_field(&mut self, field: &str, value: Value) -> Result<bool, CoercionError> {
            match field {
                "id" => self.id = FromValue::from_value(value)?,
                "name" => self.name = FromValue::from_value(value)?,
                "age" => self.age = FromValue::from_value(value)?,
                "email" => self.email = FromValue::from_value(value)?,
                _ => return Ok(false),
            }
            Ok(true)
        }
    }

    fn plan(ops: Vec<Operator>) -> QueryPlan {
        let tip = ops
            .into_iter()
            .fold(OperatorNode::source(EntityType::of::<Person>()), |n, op| {
                OperatorNode::push(&n, op)
            });
        Translator::new(&MetadataResolver::new())
            .translate(&tip)
            .unwrap()
    }

    fn row(values: Vec<Value>) -> Row {
        let columns: Arc<[String]> = ["id", "name", "age", "email"]
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .into();
        Row::new(columns, values)
    }

    #[test]
    fn test_entity_with_coercion() {
        let person: Person = materialize_entity(
            &row(vec![
                Value::Int64(1),
                "Alice".into(),
                Value::Int64(25),
                Value::Null,
            ]),
            &plan(vec![]),
        )
        .unwrap();
        assert_eq!(
            person,
            Person {
                id: 1,
                name: "Alice".into(),
                age: 25,
                email: None,
            }
        );
    }

    #[test]
    fn test_null_in_required_field_keeps_default() {
        let person: Person = materialize_entity(
            &row(vec![Value::Int64(2), Value::Null, Value::Null, "b@x".into()]),
            &plan(vec![]),
        )
        .unwrap();
        assert_eq!(person.name, "");
        assert_eq!(person.age, 0);
        assert_eq!(person.email.as_deref(), Some("b@x"));
    }

    #[test]
    fn test_coercion_failure_is_reported() {
        let err = materialize_entity::<Person>(
            &row(vec![Value::Int64(3), "Carl".into(), "old".into(), Value::Null]),
            &plan(vec![]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Materialization { .. }));
        assert!(err.to_string().contains("field 'age'"));
    }

    #[test]
    fn test_missing_column() {
        let columns: Arc<[String]> = vec!["id".to_string()].into();
        let err = materialize_entity::<Person>(
            &Row::new(columns, vec![Value::Int64(1)]),
            &plan(vec![]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("no column 'name'"));
    }

    #[test]
    fn test_record_projection() {
        let plan = plan(vec![Operator::Project(record([
            ("id", field("id")),
            ("name", field("name")),
        ]))]);
        let r = row(vec![Value::Int32(4), "Dana".into(), Value::Null, Value::Null]);

        let (id, name): (i64, String) = materialize_record(&r, &plan).unwrap();
        assert_eq!((id, name.as_str()), (4, "Dana"));

        let err = materialize_record::<(i64, String, i32)>(&r, &plan).unwrap_err();
        assert!(err.to_string().contains("taking 2 value(s)"));
    }

    #[test]
    fn test_single_value_projection() {
        let plan = plan(vec![Operator::Project(field("email"))]);
        let r = row(vec![Value::Int64(5), "Eve".into(), Value::Int64(19), Value::Null]);

        let email: Option<String> = materialize_record(&r, &plan).unwrap();
        assert_eq!(email, None);
        assert!(materialize_record::<String>(&r, &plan).is_err());
    }

    #[test]
    fn test_shape_mismatch() {
        let r = row(vec![Value::Int64(1), "A".into(), Value::Int64(1), Value::Null]);
        assert!(materialize_record::<i64>(&r, &plan(vec![])).is_err());
        assert!(
            materialize_entity::<Person>(&r, &plan(vec![Operator::Project(field("id"))])).is_err()
        );
    }
}
