//! MiniORM Core - lazy query builder, SQL translator and row materializer.
//!
//! Queries are built against typed entity collections with composable
//! operators (filter, project, limit). Only when a query is consumed is it
//! compiled into a single parameterized SQL statement, executed through a
//! [`StatementExecutor`] and materialized back into typed values.
//!
//! ```rust,ignore
//! let adults = ctx
//!     .set::<User>()
//!     .filter(field("age").gt(18))
//!     .project::<(i64, String)>(record([("id", field("id")), ("name", field("name"))]))
//!     .collect()?;
//! ```

pub mod context;
pub mod error;
pub mod executor;
pub mod expr;
pub mod mapping;
pub mod query;
pub mod value;

pub use context::{ContextConfig, DbContext, DEFAULT_CONNECTION};
pub use error::{Error, Result};
pub use executor::{Row, StatementExecutor};
pub use expr::{captured, field, lit, record, BinaryOp, Expr, IntoOperand};
pub use mapping::{
    ColumnDef, Entity, EntityMapping, EntityMetadata, EntityType, FieldMapping, FieldType,
    MetadataResolver, MetadataSource, ScalarType,
};
pub use query::{FromRecord, Operator, OutputShape, Query, QueryIter, QueryPlan, Statement};
pub use value::{CoercionError, FromValue, Value};
