//! Ledger-tracked schema setup for the 1.x database.
//!
//! Each [`Migration`] is a named DDL statement. Names of applied migrations
//! are recorded in the `migrations` ledger table, so running [`run`] again
//! only executes migrations that have not been recorded yet.

mod mysql;
mod postgres;
mod sqlite;

use std::collections::HashSet;

use tracing::{debug, error, info};

use crate::core::traits::{Dialect, Store};
use crate::core::value::{SqlValue, Statement};
use crate::drivers::Driver;
use crate::error::Result;

/// Ledger table name.
pub const LEDGER_TABLE: &str = "migrations";

/// A named schema construction step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub name: &'static str,
    pub stmt: &'static str,
}

/// The 1.x schema for a driver, in application order.
pub fn migrations_for(driver: Driver) -> &'static [Migration] {
    match driver {
        Driver::Sqlite => sqlite::MIGRATIONS,
        Driver::Postgres => postgres::MIGRATIONS,
        Driver::Mysql => mysql::MIGRATIONS,
    }
}

/// Create the 1.x schema on `target`.
///
/// Returns the number of migrations applied by this call.
pub async fn setup(target: &dyn Store) -> Result<usize> {
    let migrations = migrations_for(target.dialect().driver());
    run(target, migrations).await
}

/// Apply every migration of `migrations` that is not in the ledger yet.
///
/// Stops at the first failing statement. The failing migration is not
/// recorded, so the next call starts over from it.
pub async fn run(target: &dyn Store, migrations: &[Migration]) -> Result<usize> {
    target
        .execute(&Statement::new(format!(
            "CREATE TABLE IF NOT EXISTS {} (name VARCHAR(255), UNIQUE(name))",
            LEDGER_TABLE
        )))
        .await?;

    let completed = applied(target).await?;
    debug!(applied = completed.len(), "Loaded migration ledger");

    let insert_sql = format!(
        "INSERT INTO {} (name) VALUES ({})",
        LEDGER_TABLE,
        target.dialect().param_placeholder(1)
    );

    let mut count = 0;
    for migration in migrations {
        if completed.contains(migration.name) {
            continue;
        }

        if let Err(e) = target.execute(&Statement::new(migration.stmt)).await {
            error!(migration = migration.name, error = %e, "Migration failed");
            return Err(e);
        }

        let record =
            Statement::with_params(insert_sql.as_str(), vec![SqlValue::from(migration.name)]);
        target.execute(&record).await?;

        debug!(migration = migration.name, "Applied migration");
        count += 1;
    }

    info!(applied = count, total = migrations.len(), "Schema is up to date");
    Ok(count)
}

/// Names recorded in the ledger.
pub async fn applied(target: &dyn Store) -> Result<HashSet<String>> {
    let rows = target
        .query(&Statement::new(format!("SELECT name FROM {}", LEDGER_TABLE)))
        .await?;
    rows.iter().map(|row| row.string("name")).collect()
}
