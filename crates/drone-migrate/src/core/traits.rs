//! Core traits for backend-agnostic migration steps.
//!
//! - [`Dialect`]: backend-specific SQL fragments (Strategy pattern)
//! - [`Store`]: execute/query capability over one database connection pool
//! - [`Transaction`]: all-or-nothing unit of work opened from a [`Store`]
//! - [`FromRow`] / [`Record`]: decoding legacy rows and encoding 1.x records

use async_trait::async_trait;

use super::value::{Row, SqlValue, Statement};
use crate::drivers::DialectImpl;
use crate::error::Result;

/// SQL syntax strategy for a database engine.
///
/// A dialect is chosen once per connection and handed to every component
/// that builds SQL. It carries no state.
pub trait Dialect: Send + Sync {
    /// Dialect name for logging.
    fn name(&self) -> &str;

    /// Parameter placeholder for the 1-based `index`.
    fn param_placeholder(&self, index: usize) -> String;

    /// Comma separated placeholders for parameters `1..=count`.
    fn placeholders(&self, count: usize) -> String {
        (1..=count)
            .map(|i| self.param_placeholder(i))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Statement that makes the identifier generator of `table.column` hand
    /// out `next` on the following insert, or `None` when the backend has no
    /// separate generator to reset.
    fn reset_sequence(&self, table: &str, column: &str, next: i64) -> Option<String>;
}

/// Relational capability for one backend.
///
/// Implementations must be `Send + Sync`; steps hold a `&dyn Store` for
/// the source and another for the target.
#[async_trait]
pub trait Store: Send + Sync {
    /// Dialect of this backend.
    fn dialect(&self) -> &DialectImpl;

    /// Execute a statement outside any explicit transaction.
    /// Returns the number of affected rows.
    async fn execute(&self, stmt: &Statement) -> Result<u64>;

    /// Run a query and decode every row.
    async fn query(&self, stmt: &Statement) -> Result<Vec<Row>>;

    /// Open a transaction.
    async fn begin(&self) -> Result<Box<dyn Transaction>>;

    /// Check that the connection is usable.
    async fn ping(&self) -> Result<()>;
}

/// An open transaction.
///
/// Dropping a transaction without calling [`commit`](Transaction::commit)
/// rolls it back.
#[async_trait]
pub trait Transaction: Send {
    /// Execute a statement inside the transaction.
    async fn execute(&mut self, stmt: &Statement) -> Result<u64>;

    /// Commit all statements executed so far.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discard all statements executed so far.
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// A value decoded from one result row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self>;
}

/// A 1.x record that can be inserted into its table.
///
/// `COLUMNS` and [`values`](Record::values) exclude the primary key, which is
/// only written when [`id`](Record::id) returns `Some`.
pub trait Record {
    /// Target table.
    const TABLE: &'static str;

    /// Primary key column.
    const ID_COLUMN: &'static str;

    /// Non-key columns, in the order of [`values`](Record::values).
    const COLUMNS: &'static [&'static str];

    /// Explicit primary key, or `None` to let the backend assign one.
    fn id(&self) -> Option<i64>;

    /// Values for [`COLUMNS`](Record::COLUMNS).
    fn values(&self) -> Vec<SqlValue>;
}
