//! Rendering of query plans to SQL statements.

use super::compiler::Parameter;
use super::translator::QueryPlan;
use std::fmt;

/// Source used when a plan has no table bound.
const EMPTY_SOURCE: &str = "(SELECT 1)";

/// A rendered statement: SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Parameter>,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql)?;
        if !self.params.is_empty() {
            let params: Vec<String> = self
                .params
                .iter()
                .map(|p| format!("{}={}", p.name, p.value))
                .collect();
            write!(f, " [{}]", params.join(", "))?;
        }
        Ok(())
    }
}

/// Render `plan` as `SELECT <columns> FROM <table> [WHERE ..] [LIMIT n]`.
///
/// Rendering is purely textual; identical plans always produce identical
/// text and parameter order. `LIMIT 0` is rendered as is and requests zero
/// rows.
pub fn render(plan: &QueryPlan) -> Statement {
    let columns: Vec<&str> = plan
        .selection
        .iter()
        .map(|s| match plan.metadata {
            Some(_) => s.column.as_str(),
            None => s.field.as_str(),
        })
        .collect();

    let mut sql = String::from("SELECT ");
    sql.push_str(&columns.join(", "));
    sql.push_str(" FROM ");
    match &plan.metadata {
        Some(metadata) => sql.push_str(metadata.table_name()),
        None => sql.push_str(EMPTY_SOURCE),
    }

    let mut params = Vec::new();
    if let Some(predicate) = &plan.predicate {
        sql.push_str(" WHERE ");
        sql.push_str(&predicate.sql);
        params = predicate.params.clone();
    }

    if let Some(limit) = plan.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }

    Statement { sql, params }
}
