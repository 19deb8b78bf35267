//! Deferred query handles.

use super::materializer::{materialize_entity, materialize_record, FromRecord};
use super::operator::{Operator, OperatorNode};
use super::statement::{render, Statement};
use super::translator::QueryPlan;
use crate::context::DbContext;
use crate::error::{Error, Result};
use crate::executor::Row;
use crate::expr::Expr;
use crate::mapping::{Entity, EntityType};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

type Materialize<O> = fn(&Row, &QueryPlan) -> Result<O>;

/// A lazily evaluated query over entity `T` producing values of type `O`.
///
/// Handles only record operators. Nothing is translated or executed until a
/// consuming call ([`collect`](Self::collect), [`iter`](Self::iter),
/// [`first`](Self::first), [`first_or_none`](Self::first_or_none)), and every
/// consuming call translates and executes again. Applying an operator
/// returns a new handle and leaves the receiver usable.
pub struct Query<T: Entity, O = T> {
    context: DbContext,
    tip: Arc<OperatorNode>,
    materialize: Materialize<O>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Query<T, T> {
    pub(crate) fn new(context: DbContext) -> Self {
        Self {
            context,
            tip: OperatorNode::source(EntityType::of::<T>()),
            materialize: materialize_entity::<T>,
            _entity: PhantomData,
        }
    }

    /// Keep only entities matching `predicate`.
    ///
    /// Repeated filters are conjoined. Predicates are checked when the query
    /// is consumed, not here.
    pub fn filter(&self, predicate: Expr) -> Self {
        self.push(Operator::Filter(predicate))
    }

    /// Reshape every entity with `selector`.
    ///
    /// The selector is a single field access or a [`record`](crate::expr::record)
    /// of field accesses; `R` is built positionally from the selected values.
    pub fn project<R: FromRecord>(&self, selector: Expr) -> Query<T, R> {
        Query {
            context: self.context.clone(),
            tip: OperatorNode::push(&self.tip, Operator::Project(selector)),
            materialize: materialize_record::<R>,
            _entity: PhantomData,
        }
    }
}

impl<T: Entity, O> Query<T, O> {
    fn push(&self, operator: Operator) -> Self {
        Self {
            context: self.context.clone(),
            tip: OperatorNode::push(&self.tip, operator),
            materialize: self.materialize,
            _entity: PhantomData,
        }
    }

    /// Return at most `n` rows. `limit(0)` requests zero rows.
    pub fn limit(&self, n: u32) -> Self {
        self.push(Operator::Limit(n))
    }

    /// The recorded operator chain, latest operator first.
    pub fn operators(&self) -> impl Iterator<Item = &Operator> {
        self.tip.walk().map(OperatorNode::operator)
    }

    /// Translate the recorded chain.
    pub fn plan(&self) -> Result<QueryPlan> {
        self.context.translate(&self.tip)
    }

    /// Translate and render without executing.
    pub fn to_statement(&self) -> Result<Statement> {
        self.plan().map(|plan| render(&plan))
    }

    /// Execute and materialize every row.
    pub fn collect(&self) -> Result<Vec<O>> {
        self.iter()?.collect()
    }

    /// Execute and return an iterator materializing rows one at a time.
    ///
    /// Translation and execution errors are reported here; materialization
    /// errors are reported per item.
    pub fn iter(&self) -> Result<QueryIter<O>> {
        let plan = self.plan()?;
        let rows = self.context.execute(&render(&plan))?;
        Ok(QueryIter {
            rows: rows.into_iter(),
            plan,
            materialize: self.materialize,
        })
    }

    /// Execute with `LIMIT 1` and return the single result.
    ///
    /// Fails with [`Error::NoRows`] when the result is empty.
    pub fn first(&self) -> Result<O> {
        match self.first_or_none()? {
            Some(value) => Ok(value),
            None => Err(Error::NoRows {
                entity: EntityType::of::<T>().name().to_string(),
            }),
        }
    }

    /// Execute with `LIMIT 1` and return the result, if any.
    pub fn first_or_none(&self) -> Result<Option<O>> {
        self.limit(1).iter()?.next().transpose()
    }
}

impl<T: Entity, O> Clone for Query<T, O> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
            tip: self.tip.clone(),
            materialize: self.materialize,
            _entity: PhantomData,
        }
    }
}

impl<T: Entity, O> fmt::Debug for Query<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("entity", &EntityType::of::<T>())
            .field("operators", &self.operators().collect::<Vec<_>>())
            .finish()
    }
}

/// Rows of one execution, materialized on demand.
pub struct QueryIter<O> {
    rows: std::vec::IntoIter<Row>,
    plan: QueryPlan,
    materialize: Materialize<O>,
}

impl<O> Iterator for QueryIter<O> {
    type Item = Result<O>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        Some((self.materialize)(&row, &self.plan))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl<O> ExactSizeIterator for QueryIter<O> {}
