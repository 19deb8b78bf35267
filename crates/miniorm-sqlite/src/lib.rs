//! MiniORM SQLite - statement executor and schema bootstrap backed by
//! rusqlite.
//!
//! [`SqliteExecutor`] plugs into a [`miniorm_core::DbContext`] and runs every
//! rendered statement on a fresh connection. [`TableBuilder`] and
//! [`DatabaseInitializer`] create entity tables from their metadata and
//! insert seed rows.

pub mod connection;
pub mod error;
pub mod executor;
pub mod initializer;
pub mod schema;

pub use error::{Result, SqliteError};
pub use executor::SqliteExecutor;
pub use initializer::{DatabaseInitializer, SeedRow};
pub use schema::{create_table_sql, sql_type, TableBuilder};
