//! Database driver implementations.
//!
//! Each driver module implements the core traits for one engine:
//!
//! - [`sqlite`]: SQLite via sqlx
//! - [`postgres`]: PostgreSQL via tokio-postgres and deadpool-postgres
//! - [`mysql`]: MySQL/MariaDB via sqlx
//! - [`common`]: Shared utilities (TLS)
//!
//! # Architecture
//!
//! Each driver module implements:
//! - `Dialect`: SQL syntax strategy for the database engine
//! - `Store`: execute/query/transaction capability over a connection pool
//!
//! Dialects are dispatched through the [`DialectImpl`] enum; stores are
//! handed out as `Box<dyn Store>` by [`connect`].

pub mod common;
pub mod mysql;
pub mod postgres;
pub mod sqlite;

pub use common::SslMode;

pub use mysql::{MysqlDialect, MysqlStore};
pub use postgres::{PostgresDialect, PostgresStore};
pub use sqlite::{SqliteDialect, SqliteStore};

use tracing::info;

use crate::config::DatabaseConfig;
use crate::core::traits::{Dialect, Store};
use crate::error::{MigrateError, Result};

/// Supported database engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Sqlite,
    Postgres,
    Mysql,
}

impl Driver {
    /// Parse a driver name.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the driver is not recognized.
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "sqlite3" | "sqlite" => Ok(Driver::Sqlite),
            "postgres" | "postgresql" | "pg" => Ok(Driver::Postgres),
            "mysql" | "mariadb" => Ok(Driver::Mysql),
            other => Err(MigrateError::Config(format!(
                "Unknown database driver: '{}'. Supported drivers: sqlite3, postgres, mysql",
                other
            ))),
        }
    }
}

/// Enum-based static dispatch for dialects.
///
/// Note: We use a manual impl instead of a dispatch macro. The compiler
/// generates the same match statement.
#[derive(Debug, Clone)]
pub enum DialectImpl {
    Sqlite(SqliteDialect),
    Postgres(PostgresDialect),
    Mysql(MysqlDialect),
}

impl Dialect for DialectImpl {
    fn name(&self) -> &str {
        match self {
            DialectImpl::Sqlite(d) => d.name(),
            DialectImpl::Postgres(d) => d.name(),
            DialectImpl::Mysql(d) => d.name(),
        }
    }

    fn param_placeholder(&self, index: usize) -> String {
        match self {
            DialectImpl::Sqlite(d) => d.param_placeholder(index),
            DialectImpl::Postgres(d) => d.param_placeholder(index),
            DialectImpl::Mysql(d) => d.param_placeholder(index),
        }
    }

    fn reset_sequence(&self, table: &str, column: &str, next: i64) -> Option<String> {
        match self {
            DialectImpl::Sqlite(d) => d.reset_sequence(table, column, next),
            DialectImpl::Postgres(d) => d.reset_sequence(table, column, next),
            DialectImpl::Mysql(d) => d.reset_sequence(table, column, next),
        }
    }
}

impl DialectImpl {
    /// Dialect for a driver.
    pub fn for_driver(driver: Driver) -> Self {
        match driver {
            Driver::Sqlite => DialectImpl::Sqlite(SqliteDialect::new()),
            Driver::Postgres => DialectImpl::Postgres(PostgresDialect::new()),
            Driver::Mysql => DialectImpl::Mysql(MysqlDialect::new()),
        }
    }

    /// Create a dialect implementation from a driver name.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver name is not recognized.
    pub fn from_driver(name: &str) -> Result<Self> {
        Driver::parse(name).map(Self::for_driver)
    }

    /// Engine behind this dialect.
    pub fn driver(&self) -> Driver {
        match self {
            DialectImpl::Sqlite(_) => Driver::Sqlite,
            DialectImpl::Postgres(_) => Driver::Postgres,
            DialectImpl::Mysql(_) => Driver::Mysql,
        }
    }
}

/// Open a store for a configured database.
///
/// Source databases are opened with `read_only = true`; SQLite enforces it,
/// the other engines rely on the steps never writing to the source.
pub async fn connect(config: &DatabaseConfig, read_only: bool) -> Result<Box<dyn Store>> {
    let driver = Driver::parse(&config.driver)?;
    let store: Box<dyn Store> = match driver {
        Driver::Sqlite => Box::new(SqliteStore::connect(&config.datasource, read_only).await?),
        Driver::Postgres => Box::new(PostgresStore::connect(config).await?),
        Driver::Mysql => Box::new(MysqlStore::connect(&config.datasource).await?),
    };

    info!(
        driver = store.dialect().name(),
        read_only, "Connected to database"
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_impl_from_driver() {
        let sqlite = DialectImpl::from_driver("sqlite3").unwrap();
        assert_eq!(sqlite.name(), "sqlite3");
        assert_eq!(sqlite.driver(), Driver::Sqlite);

        let postgres = DialectImpl::from_driver("postgres").unwrap();
        assert_eq!(postgres.name(), "postgres");

        let mysql = DialectImpl::from_driver("mysql").unwrap();
        assert_eq!(mysql.name(), "mysql");

        // Alternative names
        assert!(DialectImpl::from_driver("sqlite").is_ok());
        assert!(DialectImpl::from_driver("postgresql").is_ok());
        assert!(DialectImpl::from_driver("pg").is_ok());
        assert!(DialectImpl::from_driver("MariaDB").is_ok());

        // Unknown should error
        let err = DialectImpl::from_driver("mssql").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_dialect_impl_dispatch() {
        let dialect = DialectImpl::Postgres(PostgresDialect::new());
        assert_eq!(dialect.param_placeholder(2), "$2");
        assert!(dialect.reset_sequence("users", "user_id", 3).is_some());

        let dialect = DialectImpl::Sqlite(SqliteDialect::new());
        assert_eq!(dialect.param_placeholder(2), "?");
        assert!(dialect.reset_sequence("users", "user_id", 3).is_none());
    }
}
