//! PostgreSQL driver.
//!
//! This module provides PostgreSQL-specific implementations:
//!
//! - [`PostgresDialect`]: SQL syntax strategy for PostgreSQL
//! - [`PostgresStore`]: `Store` implementation over deadpool-postgres

mod dialect;
mod store;

pub use dialect::PostgresDialect;
pub use store::PostgresStore;
