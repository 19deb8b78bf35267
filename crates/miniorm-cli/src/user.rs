//! The demo entity.

use miniorm_core::{CoercionError, Entity, EntityMapping, FromValue, Value};
use miniorm_sqlite::SeedRow;

/// A row of the `users` table.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub age: i32,
}

impl Entity for User {
    fn mapping() -> EntityMapping {
        EntityMapping::table("users")
            .column::<i32>("id", "id")
            .column::<String>("name", "name")
            .column::<i32>("age", "age")
    }

    fn set_field(&mut self, field: &str, value: Value) -> Result<bool, CoercionError> {
        match field {
            "id" => self.id = FromValue::from_value(value)?,
            "name" => self.name = FromValue::from_value(value)?,
            "age" => self.age = FromValue::from_value(value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Rows inserted into an empty `users` table.
pub fn seed() -> Vec<SeedRow> {
    [("Alice", 25), ("Bob", 17), ("Charlie", 30), ("David", 22), ("Eve", 19)]
        .into_iter()
        .map(|(name, age)| vec![("name", Value::from(name)), ("age", Value::from(age))])
        .collect()
}
