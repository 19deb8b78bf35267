//! Predicate and projection expressions.
//!
//! An [`Expr`] describes a value or boolean computed over one bound entity
//! parameter. Expressions are built with the helpers in this module and are
//! only interpreted when a query is translated:
//!
//! ```rust
//! use miniorm_core::expr::{captured, field, record};
//!
//! let min_age = 18;
//! let adults = field("age").gt(captured("min_age", min_age));
//! let named = field("name").starts_with("A").and(adults);
//! let shape = record([("id", field("id")), ("name", field("name"))]);
//! # let _ = (named, shape);
//! ```

use crate::value::Value;

/// Method name of the prefix-match string predicate.
pub const STARTS_WITH: &str = "starts_with";

/// Method name of the substring string predicate.
pub const CONTAINS: &str = "contains";

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
}

/// An expression tree over a single bound entity parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Access to a field of the bound entity.
    Field(String),
    /// A value captured from the surrounding scope.
    Captured { name: String, value: Value },
    /// A constant.
    Literal(Value),
    /// `left op right`.
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// A method call on `receiver`.
    Call {
        method: String,
        receiver: Box<Expr>,
        args: Vec<Expr>,
    },
    /// Construction of a named record, used by projections.
    Record(Vec<(String, Expr)>),
}

/// Access field `name` of the bound entity.
pub fn field(name: impl Into<String>) -> Expr {
    Expr::Field(name.into())
}

/// A constant value.
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

/// A value captured from an outer variable named `name`.
pub fn captured(name: impl Into<String>, value: impl Into<Value>) -> Expr {
    Expr::Captured {
        name: name.into(),
        value: value.into(),
    }
}

/// A named record built from `(target name, expression)` pairs.
pub fn record<N: Into<String>>(fields: impl IntoIterator<Item = (N, Expr)>) -> Expr {
    Expr::Record(fields.into_iter().map(|(n, e)| (n.into(), e)).collect())
}

/// Operands accepted by the builder methods; plain values become literals.
pub trait IntoOperand {
    /// Convert into an expression.
    fn into_operand(self) -> Expr;
}

impl IntoOperand for Expr {
    fn into_operand(self) -> Expr {
        self
    }
}

macro_rules! literal_operand {
    ($($ty:ty),*) => {
        $(
            impl IntoOperand for $ty {
                fn into_operand(self) -> Expr {
                    Expr::Literal(self.into())
                }
            }
        )*
    };
}

literal_operand!(bool, i32, i64, f64, String, &str, Value);

// Builder names follow the SQL operators they produce.
#[allow(clippy::should_implement_trait)]
impl Expr {
    /// Build `self op right`.
    pub fn binary(self, op: BinaryOp, right: impl IntoOperand) -> Expr {
        Expr::Binary {
            left: Box::new(self),
            op,
            right: Box::new(right.into_operand()),
        }
    }

    pub fn eq(self, right: impl IntoOperand) -> Expr {
        self.binary(BinaryOp::Eq, right)
    }

    pub fn ne(self, right: impl IntoOperand) -> Expr {
        self.binary(BinaryOp::Ne, right)
    }

    pub fn lt(self, right: impl IntoOperand) -> Expr {
        self.binary(BinaryOp::Lt, right)
    }

    pub fn le(self, right: impl IntoOperand) -> Expr {
        self.binary(BinaryOp::Le, right)
    }

    pub fn gt(self, right: impl IntoOperand) -> Expr {
        self.binary(BinaryOp::Gt, right)
    }

    pub fn ge(self, right: impl IntoOperand) -> Expr {
        self.binary(BinaryOp::Ge, right)
    }

    pub fn and(self, right: impl IntoOperand) -> Expr {
        self.binary(BinaryOp::And, right)
    }

    pub fn or(self, right: impl IntoOperand) -> Expr {
        self.binary(BinaryOp::Or, right)
    }

    /// Call `method` with `self` as receiver.
    pub fn call(self, method: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Call {
            method: method.into(),
            receiver: Box::new(self),
            args,
        }
    }

    /// String prefix match.
    pub fn starts_with(self, prefix: impl IntoOperand) -> Expr {
        self.call(STARTS_WITH, vec![prefix.into_operand()])
    }

    /// Substring match.
    pub fn contains(self, needle: impl IntoOperand) -> Expr {
        self.call(CONTAINS, vec![needle.into_operand()])
    }

    /// Short description of the node kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Field(_) => "field access",
            Expr::Captured { .. } => "captured value",
            Expr::Literal(_) => "literal",
            Expr::Binary { .. } => "binary operation",
            Expr::Call { .. } => "method call",
            Expr::Record(_) => "record construction",
        }
    }
}
