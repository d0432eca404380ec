//! SQLite SQL dialect (Strategy pattern).

use crate::core::traits::Dialect;

/// SQLite dialect implementation.
///
/// `INTEGER PRIMARY KEY AUTOINCREMENT` tracks the largest id ever inserted in
/// `sqlite_sequence`, explicit ids included.
#[derive(Debug, Clone, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Create a new SQLite dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &str {
        "sqlite3"
    }

    fn param_placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn reset_sequence(&self, _table: &str, _column: &str, _next: i64) -> Option<String> {
        None
    }
}
