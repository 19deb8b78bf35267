//! Database context: connection settings plus the collaborators every query
//! handle shares.

use crate::error::Result;
use crate::executor::{Row, StatementExecutor};
use crate::mapping::{Entity, EntityMetadata, EntityType, MetadataResolver, MetadataSource};
use crate::query::{OperatorNode, Query, QueryPlan, Statement, Translator};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default connection string.
pub const DEFAULT_CONNECTION: &str = "miniorm.db";

/// Context configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextConfig {
    /// Connection string handed to the executor on every call.
    pub connection: String,
    /// Log every rendered statement at info level instead of debug.
    pub log_statements: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            connection: DEFAULT_CONNECTION.to_string(),
            log_statements: false,
        }
    }
}

impl ContextConfig {
    /// Create a configuration for `connection`.
    pub fn new(connection: impl Into<String>) -> Self {
        Self {
            connection: connection.into(),
            ..Default::default()
        }
    }

    /// Set the connection string.
    pub fn with_connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = connection.into();
        self
    }

    /// Enable or disable info-level statement logging.
    pub fn with_log_statements(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }
}

/// Entry point for building queries.
///
/// Cloning is cheap; clones share the executor and metadata source.
#[derive(Clone)]
pub struct DbContext {
    config: Arc<ContextConfig>,
    executor: Arc<dyn StatementExecutor>,
    metadata: Arc<dyn MetadataSource>,
}

impl DbContext {
    /// Create a context using the process-wide metadata resolver.
    pub fn new(config: ContextConfig, executor: impl StatementExecutor + 'static) -> Self {
        Self {
            config: Arc::new(config),
            executor: Arc::new(executor),
            metadata: MetadataResolver::global(),
        }
    }

    /// Replace the metadata source.
    pub fn with_resolver(mut self, metadata: Arc<dyn MetadataSource>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Start a query over every row of `T`'s table.
    pub fn set<T: Entity>(&self) -> Query<T> {
        Query::new(self.clone())
    }

    /// Resolve the metadata of `T`.
    pub fn metadata<T: Entity>(&self) -> Result<Arc<EntityMetadata>> {
        self.metadata.resolve(&EntityType::of::<T>())
    }

    pub(crate) fn translate(&self, tip: &OperatorNode) -> Result<QueryPlan> {
        Translator::new(self.metadata.as_ref()).translate(tip)
    }

    pub(crate) fn execute(&self, statement: &Statement) -> Result<Vec<Row>> {
        if self.config.log_statements {
            info!(statement = %statement, "executing");
        } else {
            debug!(statement = %statement, "executing");
        }

        match self.executor.execute(&self.config.connection, statement) {
            Ok(rows) => {
                debug!(rows = rows.len(), "statement completed");
                Ok(rows)
            }
            Err(e) => {
                warn!(error = %e, sql = %statement.sql, "statement failed");
                Err(e)
            }
        }
    }
}

impl fmt::Debug for DbContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
