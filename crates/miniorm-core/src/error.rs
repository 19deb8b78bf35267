//! Core error types.

use crate::value::CoercionError;
use thiserror::Error;

/// Result alias used throughout the core.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while translating, executing or materializing a query.
///
/// Every variant aborts the query that triggered it; nothing is retried and
/// no partial result is returned.
#[derive(Debug, Error)]
pub enum Error {
    /// The entity type has no usable metadata.
    #[error("mapping error for '{entity}': {reason}")]
    Mapping { entity: String, reason: String },

    /// A predicate or projection references a field with no column binding.
    #[error("field '{field}' on entity '{entity}' is not mapped to a column")]
    UnmappedField { entity: String, field: String },

    /// A predicate uses an operator or call outside the supported set.
    #[error("unsupported expression on entity '{entity}': {node}")]
    UnsupportedExpression { entity: String, node: String },

    /// A projection shape that cannot be reconstructed from a row.
    #[error("unsupported projection on entity '{entity}': {reason}")]
    UnsupportedProjection { entity: String, reason: String },

    /// Row-to-value coercion or construction failed.
    #[error("cannot materialize '{entity}': {reason}")]
    Materialization { entity: String, reason: String },

    /// The execution collaborator reported a failure.
    #[error("execution error: {0}")]
    Execution(String),

    /// The operator chain did not resolve to a mapped entity.
    #[error("translation error: {0}")]
    Translation(String),

    /// `first()` was consumed against an empty result.
    #[error("query on '{entity}' returned no rows")]
    NoRows { entity: String },
}

impl Error {
    /// Create a mapping error.
    pub fn mapping(entity: &str, reason: impl Into<String>) -> Self {
        Error::Mapping {
            entity: entity.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an unmapped field error.
    pub fn unmapped_field(entity: &str, field: &str) -> Self {
        Error::UnmappedField {
            entity: entity.to_string(),
            field: field.to_string(),
        }
    }

    /// Create an unsupported expression error naming the offending node.
    pub fn unsupported_expression(entity: &str, node: impl Into<String>) -> Self {
        Error::UnsupportedExpression {
            entity: entity.to_string(),
            node: node.into(),
        }
    }

    /// Create an unsupported projection error.
    pub fn unsupported_projection(entity: &str, reason: impl Into<String>) -> Self {
        Error::UnsupportedProjection {
            entity: entity.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a materialization error.
    pub fn materialization(entity: &str, reason: impl Into<String>) -> Self {
        Error::Materialization {
            entity: entity.to_string(),
            reason: reason.into(),
        }
    }

    /// Wrap a coercion failure for a specific field.
    pub fn coercion(entity: &str, field: &str, err: CoercionError) -> Self {
        Self::materialization(entity, format!("field '{}': {}", field, err))
    }

    /// Create an execution error from any displayable source.
    pub fn execution(err: impl std::fmt::Display) -> Self {
        Error::Execution(err.to_string())
    }
}
