//! Integration tests for the query pipeline, from handle to materialized
//! values, against a recording executor.

use miniorm_core::{
    captured, field, lit, record, CoercionError, ContextConfig, DbContext, Entity, EntityMapping,
    Error, FromValue, MetadataResolver, Result, Row, Statement, StatementExecutor, Value,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[derive(Debug, Default, Clone, PartialEq)]
struct Person {
    id: i64,
    name: String,
    age: i32,
}

impl Entity for Person {
    fn mapping() -> EntityMapping {
        EntityMapping::table("people")
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

#[derive(Debug, Default)]
struct Unbound {
    id: i64,
}

impl Entity for Unbound {
    fn mapping() -> EntityMapping {
        EntityMapping::unbound().column::<i64>("id", "id")
    }

    fn set_field(&mut self, field: &str, value: Value) -> Result<bool, CoercionError> {
        match field {
            "id" => self.id = FromValue::from_value(value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Records every statement and answers with canned rows.
#[derive(Default)]
struct RecordingExecutor {
    statements: Mutex<Vec<(String, Statement)>>,
    rows: Mutex<Vec<Row>>,
    fail: Mutex<Option<String>>,
}

impl StatementExecutor for RecordingExecutor {
    fn execute(&self, connection: &str, statement: &Statement) -> Result<Vec<Row>> {
        self.statements
            .lock()
            .push((connection.to_string(), statement.clone()));
        if let Some(message) = self.fail.lock().clone() {
            return Err(Error::execution(message));
        }
        Ok(self.rows.lock().clone())
    }
}

struct TestContext {
    ctx: DbContext,
    executor: Arc<RecordingExecutor>,
}

impl TestContext {
    fn new() -> Self {
        let executor = Arc::new(RecordingExecutor::default());
        let ctx = DbContext::new(ContextConfig::new("test.db"), executor.clone())
            .with_resolver(Arc::new(MetadataResolver::new()));
        Self { ctx, executor }
    }

    fn with_rows(self, rows: Vec<Vec<Value>>) -> Self {
        let columns: Arc<[String]> = ["id", "name", "age"]
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .into();
        *self.executor.rows.lock() = rows
            .into_iter()
            .map(|values| Row::new(columns.clone(), values))
            .collect();
        self
    }

    fn statements(&self) -> Vec<Statement> {
        self.executor
            .statements
            .lock()
            .iter()
            .map(|(_, s)| s.clone())
            .collect()
    }

    fn last_sql(&self) -> String {
        self.statements()
            .last()
            .map(|s| s.sql.clone())
            .unwrap_or_default()
    }
}

fn row(id: i64, name: &str, age: i64) -> Vec<Value> {
    vec![Value::Int64(id), name.into(), Value::Int64(age)]
}

#[test]
fn test_starts_with_filter() {
    let t = TestContext::new().with_rows(vec![row(1, "Alice", 25)]);

    let people = t
        .ctx
        .set::<Person>()
        .filter(field("name").starts_with("A"))
        .collect()
        .unwrap();

    let statements = t.statements();
    assert_eq!(statements.len(), 1);
    assert_eq!(
        statements[0].sql,
        "SELECT id, name, age FROM people WHERE (name LIKE @p0)"
    );
    assert_eq!(statements[0].params[0].name, "@p0");
    assert_eq!(statements[0].params[0].value, Value::String("A%".into()));
    assert_eq!(
        people,
        vec![Person {
            id: 1,
            name: "Alice".into(),
            age: 25,
        }]
    );
}

#[test]
fn test_contains_projection_and_limit() {
    let t = TestContext::new().with_rows(vec![row(3, "Charlie", 30)]);

    let result: Vec<(i64, String)> = t
        .ctx
        .set::<Person>()
        .filter(field("name").contains("li"))
        .project(record([("id", field("id")), ("name", field("name"))]))
        .limit(1)
        .collect()
        .unwrap();

    let statement = &t.statements()[0];
    assert_eq!(
        statement.sql,
        "SELECT id, name FROM people WHERE (name LIKE @p0) LIMIT 1"
    );
    assert_eq!(statement.params[0].value, Value::String("%li%".into()));
    assert_eq!(result, vec![(3, "Charlie".to_string())]);
}

#[test]
fn test_captured_values_are_parameters() {
    let t = TestContext::new();
    let hostile = "x' OR '1'='1";

    t.ctx
        .set::<Person>()
        .filter(field("name").eq(captured("name", hostile)))
        .collect()
        .unwrap();

    let statement = &t.statements()[0];
    assert!(!statement.sql.contains(hostile));
    assert_eq!(statement.sql, "SELECT id, name, age FROM people WHERE (name = @p0)");
    assert_eq!(statement.params[0].value, Value::String(hostile.into()));
}

#[test]
fn test_chained_filters_are_conjoined() {
    let t = TestContext::new();

    t.ctx
        .set::<Person>()
        .filter(field("age").ge(18))
        .filter(field("name").starts_with("B").or(field("age").lt(lit(30))))
        .collect()
        .unwrap();

    assert_eq!(
        t.last_sql(),
        "SELECT id, name, age FROM people WHERE ((age >= @p0) AND ((name LIKE @p1) OR (age < @p2)))"
    );
    let params: Vec<_> = t.statements()[0]
        .params
        .iter()
        .map(|p| p.name.clone())
        .collect();
    assert_eq!(params, vec!["@p0", "@p1", "@p2"]);
}

#[test]
fn test_unmapped_field_executes_nothing() {
    let t = TestContext::new();

    let err = t
        .ctx
        .set::<Person>()
        .filter(field("email").eq("a@b"))
        .collect()
        .unwrap_err();

    assert!(matches!(err, Error::UnmappedField { ref field, .. } if field == "email"));
    assert!(t.statements().is_empty());
}

#[test]
fn test_unsupported_method_executes_nothing() {
    let t = TestContext::new();

    let err = t
        .ctx
        .set::<Person>()
        .filter(field("name").call("ends_with", vec![lit("e")]))
        .collect()
        .unwrap_err();

    assert!(matches!(err, Error::UnsupportedExpression { .. }));
    assert!(err.to_string().contains("ends_with"));
    assert!(t.statements().is_empty());
}

#[test]
fn test_missing_table_binding_fails_every_call() {
    let t = TestContext::new();
    let query = t.ctx.set::<Unbound>();

    for _ in 0..2 {
        assert!(matches!(query.collect().unwrap_err(), Error::Mapping { .. }));
    }
    assert!(t.statements().is_empty());
}

#[test]
fn test_first_renders_limit_one() {
    let t = TestContext::new().with_rows(vec![row(2, "Bob", 17)]);

    let bob = t.ctx.set::<Person>().filter(field("age").lt(18)).first().unwrap();

    assert_eq!(bob.name, "Bob");
    assert_eq!(
        t.last_sql(),
        "SELECT id, name, age FROM people WHERE (age < @p0) LIMIT 1"
    );
}

#[test]
fn test_first_on_empty_result() {
    let t = TestContext::new();
    let query = t.ctx.set::<Person>();

    assert!(matches!(query.first().unwrap_err(), Error::NoRows { ref entity } if entity == "Person"));
    assert_eq!(query.first_or_none().unwrap(), None);
}

#[test]
fn test_limit_zero_requests_zero_rows() {
    let t = TestContext::new();
    let statement = t.ctx.set::<Person>().limit(0).to_statement().unwrap();
    assert_eq!(statement.sql, "SELECT id, name, age FROM people LIMIT 0");
    assert!(t.statements().is_empty());
}

#[test]
fn test_handles_are_reusable() {
    let t = TestContext::new().with_rows(vec![row(1, "Alice", 25), row(3, "Charlie", 30)]);
    let base = t.ctx.set::<Person>();
    let adults = base.filter(field("age").gt(18));
    let limited = adults.limit(1);

    assert_eq!(adults.collect().unwrap().len(), 2);
    assert_eq!(adults.collect().unwrap().len(), 2);
    limited.collect().unwrap();
    base.collect().unwrap();

    let sql: Vec<_> = t.statements().into_iter().map(|s| s.sql).collect();
    assert_eq!(
        sql,
        vec![
            "SELECT id, name, age FROM people WHERE (age > @p0)",
            "SELECT id, name, age FROM people WHERE (age > @p0)",
            "SELECT id, name, age FROM people WHERE (age > @p0) LIMIT 1",
            "SELECT id, name, age FROM people",
        ]
    );
}

#[test]
fn test_single_field_projection() {
    let t = TestContext::new().with_rows(vec![row(1, "Alice", 25)]);

    let names: Vec<String> = t
        .ctx
        .set::<Person>()
        .project(field("name"))
        .collect()
        .unwrap();

    assert_eq!(t.last_sql(), "SELECT name FROM people");
    assert_eq!(names, vec!["Alice".to_string()]);
}

#[test]
fn test_projection_arity_mismatch() {
    let t = TestContext::new().with_rows(vec![row(1, "Alice", 25)]);

    let err = t
        .ctx
        .set::<Person>()
        .project::<(i64, String, i32)>(record([("id", field("id")), ("name", field("name"))]))
        .collect()
        .unwrap_err();

    assert!(matches!(err, Error::Materialization { .. }));
}

#[test]
fn test_iter_materializes_lazily() {
    let t = TestContext::new().with_rows(vec![
        row(1, "Alice", 25),
        vec![Value::Int64(2), "Bob".into(), "seventeen".into()],
    ]);

    let mut iter = t.ctx.set::<Person>().iter().unwrap();
    assert_eq!(iter.len(), 2);
    assert_eq!(iter.next().unwrap().unwrap().name, "Alice");
    assert!(iter.next().unwrap().is_err());
    assert!(iter.next().is_none());
}

#[test]
fn test_execution_errors_propagate() {
    let t = TestContext::new();
    *t.executor.fail.lock() = Some("disk I/O error".into());

    let err = t.ctx.set::<Person>().collect().unwrap_err();

    assert!(matches!(err, Error::Execution(ref m) if m.contains("disk I/O")));
    let recorded = t.executor.statements.lock();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].0, "test.db");
}
