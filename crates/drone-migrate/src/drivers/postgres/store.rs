//! PostgreSQL store implementation.
//!
//! Uses deadpool-postgres for connection pooling. Parameters are bound as
//! [`SqlValue`]s and adapt to the column type the server infers for each
//! placeholder, so callers never need casts in their SQL.

use std::error::Error as StdError;
use std::str::FromStr;

use async_trait::async_trait;
use bytes::BytesMut;
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use tokio_postgres::types::{to_sql_checked, IsNull, ToSql, Type};
use tokio_postgres::Config as PgConfig;
use tracing::{debug, info, warn};

use super::PostgresDialect;
use crate::config::DatabaseConfig;
use crate::core::traits::{Store, Transaction};
use crate::core::value::{Row, SqlValue, Statement};
use crate::drivers::common::SslMode;
use crate::drivers::DialectImpl;
use crate::error::{MigrateError, Result};

/// Maximum pooled connections.
const MAX_CONNECTIONS: usize = 4;

/// PostgreSQL store backed by a deadpool pool.
pub struct PostgresStore {
    pool: Pool,
    dialect: DialectImpl,
}

impl PostgresStore {
    /// Connect using a URL or key/value datasource.
    ///
    /// An explicit `ssl_mode` in the configuration wins over the `sslmode`
    /// of the datasource.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pg_config = PgConfig::from_str(&config.datasource)
            .map_err(|e| MigrateError::Config(format!("Invalid PostgreSQL datasource: {}", e)))?;

        let ssl_mode = match config.ssl_mode.as_deref() {
            Some(mode) => SslMode::parse(mode)?,
            None => SslMode::from_datasource(pg_config.get_ssl_mode()),
        };

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let mgr = match ssl_mode.connector()? {
            Some(tls) => Manager::from_config(pg_config, tls, mgr_config),
            None => {
                warn!("PostgreSQL TLS is disabled. Credentials will be transmitted in plaintext.");
                Manager::from_config(pg_config, tokio_postgres::NoTls, mgr_config)
            }
        };

        let pool = Pool::builder(mgr)
            .max_size(MAX_CONNECTIONS)
            .build()
            .map_err(|e| MigrateError::pool(e, "creating PostgreSQL pool"))?;

        let store = Self {
            pool,
            dialect: DialectImpl::Postgres(PostgresDialect::new()),
        };
        store.ping().await?;

        info!(ssl_mode = ?ssl_mode, "Connected to PostgreSQL");
        Ok(store)
    }

    async fn client(&self, context: &str) -> Result<Object> {
        self.pool
            .get()
            .await
            .map_err(|e| MigrateError::pool(e, context.to_string()))
    }
}

/// A [`SqlValue`] bound as a PostgreSQL parameter.
#[derive(Debug)]
struct PgParam<'a>(&'a SqlValue);

impl ToSql for PgParam<'_> {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> std::result::Result<IsNull, Box<dyn StdError + Sync + Send>> {
        match self.0 {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(v) => match *ty {
                Type::INT2 => i16::from(*v).to_sql(ty, out),
                Type::INT4 => i32::from(*v).to_sql(ty, out),
                Type::INT8 => i64::from(*v).to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
            SqlValue::I64(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql(ty, out),
                Type::BOOL => (*v != 0).to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
            SqlValue::Text(s) => match *ty {
                Type::BYTEA => s.as_bytes().to_sql(ty, out),
                _ => s.as_str().to_sql(ty, out),
            },
            SqlValue::Bytes(b) => match *ty {
                Type::BYTEA => b.as_slice().to_sql(ty, out),
                _ => std::str::from_utf8(b)?.to_sql(ty, out),
            },
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn decode_row(row: &tokio_postgres::Row) -> Result<Row> {
    let mut out = Row::with_capacity(row.len());
    for (i, column) in row.columns().iter().enumerate() {
        let name = column.name();
        let err = |e: tokio_postgres::Error| MigrateError::decode(name, e.to_string());
        let value = match *column.type_() {
            Type::BOOL => row.try_get::<_, Option<bool>>(i).map_err(err)?.map(SqlValue::Bool),
            Type::INT2 => row
                .try_get::<_, Option<i16>>(i)
                .map_err(err)?
                .map(|v| SqlValue::I64(v.into())),
            Type::INT4 => row
                .try_get::<_, Option<i32>>(i)
                .map_err(err)?
                .map(|v| SqlValue::I64(v.into())),
            Type::INT8 => row.try_get::<_, Option<i64>>(i).map_err(err)?.map(SqlValue::I64),
            Type::BYTEA => row
                .try_get::<_, Option<Vec<u8>>>(i)
                .map_err(err)?
                .map(SqlValue::Bytes),
            _ => row
                .try_get::<_, Option<String>>(i)
                .map_err(err)?
                .map(SqlValue::Text),
        };
        out.push(name, value.unwrap_or(SqlValue::Null));
    }
    Ok(out)
}

#[async_trait]
impl Store for PostgresStore {
    fn dialect(&self) -> &DialectImpl {
        &self.dialect
    }

    async fn execute(&self, stmt: &Statement) -> Result<u64> {
        let client = self.client("getting connection for execute").await?;
        let wrapped: Vec<PgParam<'_>> = stmt.params.iter().map(PgParam).collect();
        let refs: Vec<&(dyn ToSql + Sync)> =
            wrapped.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        Ok(client.execute(stmt.sql.as_str(), &refs).await?)
    }

    async fn query(&self, stmt: &Statement) -> Result<Vec<Row>> {
        let client = self.client("getting connection for query").await?;
        let wrapped: Vec<PgParam<'_>> = stmt.params.iter().map(PgParam).collect();
        let refs: Vec<&(dyn ToSql + Sync)> =
            wrapped.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        let rows = client.query(stmt.sql.as_str(), &refs).await?;
        debug!(rows = rows.len(), "PostgreSQL query returned");
        rows.iter().map(decode_row).collect()
    }

    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        let client = self.client("getting connection for transaction").await?;
        client.batch_execute("BEGIN").await?;
        Ok(Box::new(PostgresTransaction {
            client: Some(client),
        }))
    }

    async fn ping(&self) -> Result<()> {
        let client = self.client("testing PostgreSQL connection").await?;
        client.simple_query("SELECT 1").await?;
        Ok(())
    }
}

/// Open PostgreSQL transaction on a dedicated pooled connection.
///
/// If dropped before commit or rollback, the connection is detached from the
/// pool and closed; the server then discards the transaction.
struct PostgresTransaction {
    client: Option<Object>,
}

impl PostgresTransaction {
    fn client(&self) -> Result<&Object> {
        self.client
            .as_ref()
            .ok_or_else(|| MigrateError::pool("transaction already finished", "postgres transaction"))
    }

    async fn finish(mut self: Box<Self>, sql: &str) -> Result<()> {
        if let Some(client) = self.client.take() {
            if let Err(e) = client.batch_execute(sql).await {
                drop(Object::take(client));
                return Err(e.into());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Transaction for PostgresTransaction {
    async fn execute(&mut self, stmt: &Statement) -> Result<u64> {
        let client = self.client()?;
        let wrapped: Vec<PgParam<'_>> = stmt.params.iter().map(PgParam).collect();
        let refs: Vec<&(dyn ToSql + Sync)> =
            wrapped.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        Ok(client.execute(stmt.sql.as_str(), &refs).await?)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.finish("COMMIT").await
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.finish("ROLLBACK").await
    }
}

impl Drop for PostgresTransaction {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            drop(Object::take(client));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &SqlValue, ty: &Type) -> (IsNull, Vec<u8>) {
        let mut buf = BytesMut::new();
        let is_null = PgParam(value).to_sql(ty, &mut buf).unwrap();
        (is_null, buf.to_vec())
    }

    #[test]
    fn test_param_adapts_integer_width() {
        let (_, int4) = encode(&SqlValue::I64(7), &Type::INT4);
        assert_eq!(int4, 7i32.to_be_bytes().to_vec());

        let (_, int8) = encode(&SqlValue::I64(7), &Type::INT8);
        assert_eq!(int8, 7i64.to_be_bytes().to_vec());

        let mut buf = BytesMut::new();
        assert!(PgParam(&SqlValue::I64(i64::MAX))
            .to_sql(&Type::INT4, &mut buf)
            .is_err());
    }

    #[test]
    fn test_param_null_and_bool() {
        let (is_null, _) = encode(&SqlValue::Null, &Type::TEXT);
        assert!(matches!(is_null, IsNull::Yes));

        let (_, b) = encode(&SqlValue::Bool(true), &Type::BOOL);
        assert_eq!(b, vec![1]);

        let (_, i) = encode(&SqlValue::I64(0), &Type::BOOL);
        assert_eq!(i, vec![0]);
    }

    #[test]
    fn test_param_text_and_bytes() {
        let (_, t) = encode(&SqlValue::from("abc"), &Type::VARCHAR);
        assert_eq!(t, b"abc".to_vec());

        let (_, b) = encode(&SqlValue::Bytes(vec![9, 8]), &Type::BYTEA);
        assert_eq!(b, vec![9, 8]);
    }
}
