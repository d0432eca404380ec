//! SQLite driver.
//!
//! - [`SqliteDialect`]: SQL syntax strategy for SQLite
//! - [`SqliteStore`]: `Store` implementation over a sqlx pool
//!
//! # Connection String
//!
//! Accepts a file path, `sqlite://path` or `:memory:`.

mod dialect;
mod store;

pub use dialect::SqliteDialect;
pub use store::SqliteStore;
