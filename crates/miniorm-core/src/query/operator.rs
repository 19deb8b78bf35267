//! Recorded operator chain of a query handle.

use crate::expr::Expr;
use crate::mapping::EntityType;
use std::sync::Arc;

/// One operator applied to a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// The entity collection the chain starts from.
    Source(EntityType),
    /// Keep rows matching a predicate.
    Filter(Expr),
    /// Reshape rows with a selector.
    Project(Expr),
    /// Cap the number of rows.
    Limit(u32),
}

/// A node in the singly linked chain from the latest operator back to the
/// source. Nodes are never mutated; applying an operator allocates a new
/// node pointing at the previous one.
#[derive(Debug)]
pub struct OperatorNode {
    operator: Operator,
    parent: Option<Arc<OperatorNode>>,
}

impl OperatorNode {
    /// Start a chain at `entity`.
    pub fn source(entity: EntityType) -> Arc<Self> {
        Arc::new(Self {
            operator: Operator::Source(entity),
            parent: None,
        })
    }

    /// Append `operator` after `parent`.
    pub fn push(parent: &Arc<OperatorNode>, operator: Operator) -> Arc<Self> {
        Arc::new(Self {
            operator,
            parent: Some(parent.clone()),
        })
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn parent(&self) -> Option<&OperatorNode> {
        self.parent.as_deref()
    }

    /// Iterate from this node back to the source.
    pub fn walk(&self) -> impl Iterator<Item = &OperatorNode> {
        std::iter::successors(Some(self), |&node| node.parent())
    }
}
