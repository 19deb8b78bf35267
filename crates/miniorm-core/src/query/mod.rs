//! Query pipeline: operator chain, translation, SQL rendering and
//! materialization.
//!
//! A [`Query`] only records operators. Each consuming call walks the chain
//! with a [`Translator`], renders the resulting [`QueryPlan`] to a
//! [`Statement`], hands it to the context's executor and materializes the
//! returned rows.

mod compiler;
mod handle;
mod materializer;
mod operator;
mod statement;
mod translator;

pub use compiler::{compile, CompiledPredicate, Parameter, PredicateCompiler, PLACEHOLDER_PREFIX};
pub use handle::{Query, QueryIter};
pub use materializer::{materialize_entity, materialize_record, FromRecord};
pub use operator::{Operator, OperatorNode};
pub use statement::{render, Statement};
pub use translator::{OutputShape, QueryPlan, Selection, Translator};
