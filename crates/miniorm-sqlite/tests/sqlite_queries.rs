//! End-to-end queries against a SQLite file.

use miniorm_core::{
    field, record, CoercionError, ContextConfig, DbContext, Entity, EntityMapping, Error,
    FromValue, MetadataResolver, Value,
};
use miniorm_sqlite::{DatabaseInitializer, SeedRow, SqliteExecutor};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[derive(Debug, Default, Clone, PartialEq)]
struct User {
    id: i64,
    name: String,
    age: i32,
}

impl Entity for User {
    fn mapping() -> EntityMapping {
        EntityMapping::table("users")
            .column::<i64>("id", "id")
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

fn seed() -> Vec<SeedRow> {
    [("Alice", 25), ("Bob", 17), ("Charlie", 30), ("David", 22), ("Eve", 19)]
        .into_iter()
        .map(|(name, age)| vec![("name", Value::from(name)), ("age", Value::from(age))])
        .collect()
}

struct TestDb {
    ctx: DbContext,
    initializer: DatabaseInitializer,
    _dir: tempfile::TempDir,
}

impl TestDb {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let connection = format!("Data Source={}", dir.path().join("users.db").display());
        let resolver = Arc::new(MetadataResolver::new());

        let initializer = DatabaseInitializer::new(connection.clone()).with_resolver(resolver.clone());
        assert_eq!(initializer.initialize::<User>(&seed()).unwrap(), 5);

        let ctx = DbContext::new(ContextConfig::new(connection), SqliteExecutor::new())
            .with_resolver(resolver);
        Self {
            ctx,
            initializer,
            _dir: dir,
        }
    }

    fn names(users: &[User]) -> Vec<&str> {
        users.iter().map(|u| u.name.as_str()).collect()
    }
}

#[test]
fn test_seed_runs_once() {
    let db = TestDb::new();
    assert_eq!(db.initializer.initialize::<User>(&seed()).unwrap(), 0);
    assert_eq!(db.ctx.set::<User>().collect().unwrap().len(), 5);

    assert_eq!(db.initializer.reset::<User>(&seed()[..2]).unwrap(), 2);
    assert_eq!(db.ctx.set::<User>().collect().unwrap().len(), 2);
}

#[test]
fn test_starts_with() {
    let db = TestDb::new();
    let users = db
        .ctx
        .set::<User>()
        .filter(field("name").starts_with("A"))
        .collect()
        .unwrap();
    assert_eq!(
        users,
        vec![User {
            id: 1,
            name: "Alice".into(),
            age: 25,
        }]
    );
}

#[test]
fn test_contains_projection_limit() {
    let db = TestDb::new();
    let rows: Vec<(i64, String)> = db
        .ctx
        .set::<User>()
        .filter(field("name").contains("li"))
        .project(record([("id", field("id")), ("name", field("name"))]))
        .limit(1)
        .collect()
        .unwrap();
    assert_eq!(rows, vec![(1, "Alice".to_string())]);
}

#[test]
fn test_comparisons() {
    let db = TestDb::new();

    let adults = db.ctx.set::<User>().filter(field("age").gt(18)).collect().unwrap();
    assert_eq!(TestDb::names(&adults), vec!["Alice", "Charlie", "David", "Eve"]);

    let rows: Vec<(String, i32)> = db
        .ctx
        .set::<User>()
        .filter(field("age").ge(20))
        .project(record([("name", field("name")), ("age", field("age"))]))
        .collect()
        .unwrap();
    assert_eq!(
        rows,
        vec![
            ("Alice".to_string(), 25),
            ("Charlie".to_string(), 30),
            ("David".to_string(), 22),
        ]
    );
}

#[test]
fn test_first_and_limit_zero() {
    let db = TestDb::new();

    let first = db.ctx.set::<User>().filter(field("age").ge(18)).first().unwrap();
    assert_eq!(first.name, "Alice");

    let none = db.ctx.set::<User>().filter(field("age").gt(100)).first();
    assert!(matches!(none, Err(Error::NoRows { .. })));

    assert!(db.ctx.set::<User>().limit(0).collect().unwrap().is_empty());
}

#[test]
fn test_largest_limit_returns_every_row() {
    let db = TestDb::new();
    let all = db.ctx.set::<User>().collect().unwrap();
    let capped = db.ctx.set::<User>().limit(u32::MAX).collect().unwrap();
    assert!(!all.is_empty());
    assert_eq!(capped, all);
}

#[test]
fn test_injection_attempt_matches_nothing() {
    let db = TestDb::new();
    let users = db
        .ctx
        .set::<User>()
        .filter(field("name").eq("x' OR '1'='1"))
        .collect()
        .unwrap();
    assert!(users.is_empty());
}

#[test]
fn test_missing_database_directory_is_execution_error() {
    let dir = tempfile::tempdir().unwrap();
    let connection = dir.path().join("missing").join("users.db");
    let ctx = DbContext::new(
        ContextConfig::new(connection.to_string_lossy()),
        SqliteExecutor::new(),
    )
    .with_resolver(Arc::new(MetadataResolver::new()));

    let err = ctx.set::<User>().collect().unwrap_err();
    assert!(matches!(err, Error::Execution(_)));
}
