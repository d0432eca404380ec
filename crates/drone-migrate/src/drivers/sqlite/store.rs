//! SQLite store implementation.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column as _, Row as _, TypeInfo as _, ValueRef as _};
use tracing::debug;

use super::SqliteDialect;
use crate::core::traits::{Store, Transaction};
use crate::core::value::{Row, SqlValue, Statement};
use crate::drivers::DialectImpl;
use crate::error::{MigrateError, Result};

/// Connection pool timeout.
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// SQLite store backed by a sqlx pool.
pub struct SqliteStore {
    pool: SqlitePool,
    dialect: DialectImpl,
}

impl SqliteStore {
    /// Open a SQLite database.
    ///
    /// In-memory databases live as long as their single pooled connection,
    /// so the pool never recycles it.
    pub async fn connect(datasource: &str, read_only: bool) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(datasource)
            .map_err(|e| MigrateError::pool(e, "parsing SQLite datasource"))?
            .read_only(read_only)
            .create_if_missing(!read_only);

        let in_memory = datasource.contains(":memory:") || datasource.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(4)
        };

        let pool = pool_options
            .acquire_timeout(POOL_CONNECTION_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| MigrateError::pool(e, "creating SQLite pool"))?;

        debug!(datasource, read_only, "Opened SQLite database");

        Ok(Self {
            pool,
            dialect: DialectImpl::Sqlite(SqliteDialect::new()),
        })
    }

    /// Open a fresh private in-memory database.
    pub async fn memory() -> Result<Self> {
        Self::connect(":memory:", false).await
    }
}

fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [SqlValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            SqlValue::Null => query.bind(None::<i64>),
            SqlValue::Bool(v) => query.bind(*v),
            SqlValue::I64(v) => query.bind(*v),
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Bytes(b) => query.bind(b.as_slice()),
        };
    }
    query
}

/// Decode a row by the storage class of each value.
fn decode_row(row: &SqliteRow) -> Result<Row> {
    let mut out = Row::with_capacity(row.len());
    for (i, column) in row.columns().iter().enumerate() {
        let name = column.name();
        let raw = row.try_get_raw(i)?;
        if raw.is_null() {
            out.push(name, SqlValue::Null);
            continue;
        }
        let type_name = raw.type_info().name().to_string();
        let value = match type_name.as_str() {
            "INTEGER" | "BOOLEAN" => SqlValue::I64(row.try_get_unchecked::<i64, _>(i)?),
            "BLOB" => SqlValue::Bytes(row.try_get_unchecked::<Vec<u8>, _>(i)?),
            _ => SqlValue::Text(row.try_get_unchecked::<String, _>(i)?),
        };
        out.push(name, value);
    }
    Ok(out)
}

#[async_trait]
impl Store for SqliteStore {
    fn dialect(&self) -> &DialectImpl {
        &self.dialect
    }

    async fn execute(&self, stmt: &Statement) -> Result<u64> {
        let result = bind_params(sqlx::query(&stmt.sql), &stmt.params)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn query(&self, stmt: &Statement) -> Result<Vec<Row>> {
        let rows = bind_params(sqlx::query(&stmt.sql), &stmt.params)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(decode_row).collect()
    }

    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteTransaction { tx }))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| MigrateError::pool(e, "testing SQLite connection"))?;
        Ok(())
    }
}

/// Open SQLite transaction. sqlx rolls back on drop.
struct SqliteTransaction {
    tx: sqlx::Transaction<'static, Sqlite>,
}

#[async_trait]
impl Transaction for SqliteTransaction {
    async fn execute(&mut self, stmt: &Statement) -> Result<u64> {
        let result = bind_params(sqlx::query(&stmt.sql), &stmt.params)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
