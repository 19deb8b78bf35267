//! Compiler from predicate expressions to SQL fragments.
//!
//! Field accesses on the bound entity become column names; every other leaf
//! (literals, captured values, string-predicate arguments) becomes a
//! positional placeholder whose value travels out of band. No value is ever
//! written into the SQL text.

use crate::error::{Error, Result};
use crate::expr::{BinaryOp, Expr, CONTAINS, STARTS_WITH};
use crate::mapping::{EntityMetadata, ScalarType};
use crate::value::Value;

/// Prefix of generated placeholder names.
pub const PLACEHOLDER_PREFIX: &str = "@p";

/// A positional parameter bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Placeholder name as it appears in the SQL text (`@p0`, `@p1`, ...).
    pub name: String,
    /// Bound value.
    pub value: Value,
}

/// A compiled `WHERE` fragment and its parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPredicate {
    pub sql: String,
    pub params: Vec<Parameter>,
}

/// Compile a single predicate against `metadata`.
pub fn compile(expr: &Expr, metadata: &EntityMetadata) -> Result<CompiledPredicate> {
    let mut compiler = PredicateCompiler::new(metadata);
    let sql = compiler.fragment(expr)?;
    Ok(CompiledPredicate {
        sql,
        params: compiler.finish(),
    })
}

/// Compiler state for one pass; placeholders are numbered across every
/// fragment produced by the same instance.
pub struct PredicateCompiler<'m> {
    metadata: &'m EntityMetadata,
    params: Vec<Parameter>,
}

impl<'m> PredicateCompiler<'m> {
    /// Create a compiler for predicates over `metadata`'s entity.
    pub fn new(metadata: &'m EntityMetadata) -> Self {
        Self {
            metadata,
            params: Vec::new(),
        }
    }

    /// Compile `expr` into a SQL fragment, allocating placeholders as needed.
    pub fn fragment(&mut self, expr: &Expr) -> Result<String> {
        let mut sql = String::new();
        self.visit(expr, &mut sql)?;
        Ok(sql)
    }

    /// The parameters allocated so far, in placeholder order.
    pub fn finish(self) -> Vec<Parameter> {
        self.params
    }

    fn visit(&mut self, expr: &Expr, sql: &mut String) -> Result<()> {
        match expr {
            Expr::Field(name) => {
                let column = self
                    .metadata
                    .column(name)
                    .ok_or_else(|| Error::unmapped_field(self.entity(), name))?;
                sql.push_str(&column.column);
            }
            Expr::Captured { value, .. } | Expr::Literal(value) => {
                self.placeholder(value.clone(), sql);
            }
            Expr::Binary { left, op, right } => {
                sql.push('(');
                self.visit(left, sql)?;
                sql.push(' ');
                sql.push_str(Self::sql_operator(*op));
                sql.push(' ');
                self.visit(right, sql)?;
                sql.push(')');
            }
            Expr::Call {
                method,
                receiver,
                args,
            } => {
                let pattern = match (method.as_str(), args.as_slice()) {
                    (STARTS_WITH, [arg]) => format!("{}%", self.argument(method, arg)?),
                    (CONTAINS, [arg]) => format!("%{}%", self.argument(method, arg)?),
                    _ => {
                        return Err(Error::unsupported_expression(
                            self.entity(),
                            format!("method '{}' with {} argument(s)", method, args.len()),
                        ))
                    }
                };
                sql.push('(');
                self.visit(receiver, sql)?;
                sql.push_str(" LIKE ");
                self.placeholder(Value::String(pattern), sql);
                sql.push(')');
            }
            Expr::Record(_) => {
                return Err(Error::unsupported_expression(self.entity(), expr.kind()));
            }
        }
        Ok(())
    }

    /// Evaluate a string-predicate argument to its text.
    fn argument(&self, method: &str, arg: &Expr) -> Result<String> {
        let value = match arg {
            Expr::Literal(v) | Expr::Captured { value: v, .. } => v.clone(),
            other => {
                return Err(Error::unsupported_expression(
                    self.entity(),
                    format!("{} as argument of '{}'", other.kind(), method),
                ))
            }
        };
        match value.coerce(ScalarType::String) {
            Ok(Value::String(s)) => Ok(s),
            _ => Err(Error::unsupported_expression(
                self.entity(),
                format!("non-text argument of '{}'", method),
            )),
        }
    }

    fn placeholder(&mut self, value: Value, sql: &mut String) {
        let name = format!("{}{}", PLACEHOLDER_PREFIX, self.params.len());
        sql.push_str(&name);
        self.params.push(Parameter { name, value });
    }

    fn sql_operator(op: BinaryOp) -> &'static str {
        match op {
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
        }
    }

    fn entity(&self) -> &'static str {
        self.metadata.entity_name()
    }
}
