//! PostgreSQL SQL dialect (Strategy pattern).
//!
//! Numbered `$n` placeholders and explicit `SERIAL` sequences that must be
//! advanced after rows are inserted with explicit ids.

use crate::core::traits::Dialect;

/// PostgreSQL dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Create a new PostgreSQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &str {
        "postgres"
    }

    fn param_placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn reset_sequence(&self, table: &str, column: &str, next: i64) -> Option<String> {
        // SERIAL columns own a sequence named <table>_<column>_seq
        Some(format!(
            "ALTER SEQUENCE {}_{}_seq RESTART WITH {}",
            table, column, next
        ))
    }
}
