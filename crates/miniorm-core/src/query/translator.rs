//! Translation of an operator chain into a query plan.

use super::compiler::{CompiledPredicate, PredicateCompiler};
use super::operator::{Operator, OperatorNode};
use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::mapping::{EntityMetadata, EntityType, FieldType, MetadataSource};
use std::sync::Arc;
use tracing::trace;

/// One selected column and where its value goes in the output.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Entity field the value is read for.
    pub field: String,
    /// Name of the value in the output shape.
    pub target: String,
    /// Column the value is read from.
    pub column: String,
    /// Declared type of the field.
    pub field_type: FieldType,
}

/// Shape of each materialized row.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputShape {
    /// A fully populated entity instance.
    Entity,
    /// A positional record with the given member names.
    Record(Vec<String>),
    /// A single field value.
    Value(FieldType),
}

/// The fully resolved description of one statement.
///
/// Plans are built fresh for every execution and never cached.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    /// Queried entity type.
    pub entity: EntityType,
    /// Bound metadata; `None` only for plans built by hand.
    pub metadata: Option<Arc<EntityMetadata>>,
    /// Selected columns in output order.
    pub selection: Vec<Selection>,
    /// Output shape.
    pub shape: OutputShape,
    /// Conjunction of every filter, with its parameters.
    pub predicate: Option<CompiledPredicate>,
    /// Row cap.
    pub limit: Option<u32>,
}

impl QueryPlan {
    /// Entity name used in diagnostics.
    pub fn entity_name(&self) -> &'static str {
        self.entity.name()
    }
}

/// Walks an operator chain once and builds a [`QueryPlan`].
pub struct Translator<'a> {
    metadata: &'a dyn MetadataSource,
}

impl<'a> Translator<'a> {
    pub fn new(metadata: &'a dyn MetadataSource) -> Self {
        Self { metadata }
    }

    /// Translate the chain ending at `tip`.
    ///
    /// Filters are conjoined with the one closest to the source first. The
    /// outermost projection and the outermost limit win.
    pub fn translate(&self, tip: &OperatorNode) -> Result<QueryPlan> {
        let mut filters: Vec<&Expr> = Vec::new();
        let mut projection: Option<&Expr> = None;
        let mut limit: Option<u32> = None;
        let mut source: Option<EntityType> = None;

        for node in tip.walk() {
            match node.operator() {
                Operator::Filter(predicate) => filters.push(predicate),
                Operator::Project(selector) => {
                    projection.get_or_insert(selector);
                }
                Operator::Limit(n) => {
                    limit.get_or_insert(*n);
                }
                Operator::Source(entity) => source = Some(*entity),
            }
        }

        let entity = source.ok_or_else(|| {
            Error::Translation("operator chain does not start from an entity source".into())
        })?;
        let metadata = self.metadata.resolve(&entity)?;

        let predicate = Self::conjoin(&metadata, filters.into_iter().rev())?;

        let (selection, shape) = match projection {
            Some(selector) => Self::projection(&metadata, selector)?,
            None => (Self::all_columns(&metadata), OutputShape::Entity),
        };

        trace!(
            entity = entity.name(),
            columns = selection.len(),
            filtered = predicate.is_some(),
            limit = ?limit,
            "translated query"
        );

        Ok(QueryPlan {
            entity,
            metadata: Some(metadata),
            selection,
            shape,
            predicate,
            limit,
        })
    }

    fn conjoin<'e>(
        metadata: &EntityMetadata,
        filters: impl Iterator<Item = &'e Expr>,
    ) -> Result<Option<CompiledPredicate>> {
        let mut compiler = PredicateCompiler::new(metadata);
        let mut sql: Option<String> = None;
        for filter in filters {
            let fragment = compiler.fragment(filter)?;
            sql = Some(match sql {
                Some(acc) => format!("({} AND {})", acc, fragment),
                None => fragment,
            });
        }
        Ok(sql.map(|sql| CompiledPredicate {
            sql,
            params: compiler.finish(),
        }))
    }

    fn all_columns(metadata: &EntityMetadata) -> Vec<Selection> {
        metadata
            .columns()
            .iter()
            .map(|c| Selection {
                field: c.field.clone(),
                target: c.field.clone(),
                column: c.column.clone(),
                field_type: c.field_type,
            })
            .collect()
    }

    fn projection(metadata: &EntityMetadata, selector: &Expr) -> Result<(Vec<Selection>, OutputShape)> {
        match selector {
            Expr::Field(name) => {
                let selection = Self::select(metadata, name, name)?;
                let shape = OutputShape::Value(selection.field_type);
                Ok((vec![selection], shape))
            }
            Expr::Record(members) if !members.is_empty() => {
                let mut selection = Vec::with_capacity(members.len());
                for (target, member) in members {
                    match member {
                        Expr::Field(name) => selection.push(Self::select(metadata, name, target)?),
                        other => {
                            return Err(Error::unsupported_projection(
                                metadata.entity_name(),
                                format!("member '{}' is a {}, not a field access", target, other.kind()),
                            ))
                        }
                    }
                }
                let names = selection.iter().map(|s| s.target.clone()).collect();
                Ok((selection, OutputShape::Record(names)))
            }
            Expr::Record(_) => Err(Error::unsupported_projection(
                metadata.entity_name(),
                "record has no members",
            )),
            other => Err(Error::unsupported_projection(
                metadata.entity_name(),
                format!("selector is a {}", other.kind()),
            )),
        }
    }

    fn select(metadata: &EntityMetadata, field: &str, target: &str) -> Result<Selection> {
        let column = metadata
            .column(field)
            .ok_or_else(|| Error::unmapped_field(metadata.entity_name(), field))?;
        Ok(Selection {
            field: field.to_string(),
            target: target.to_string(),
            column: column.column.clone(),
            field_type: column.field_type,
        })
    }
}
