//! MySQL/MariaDB store implementation.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column as _, Row as _, TypeInfo as _, ValueRef as _};
use tracing::debug;

use super::MysqlDialect;
use crate::core::traits::{Store, Transaction};
use crate::core::value::{Row, SqlValue, Statement};
use crate::drivers::DialectImpl;
use crate::error::{MigrateError, Result};

/// Connection pool timeout.
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Go driver parameters that have no meaning to sqlx.
const GO_ONLY_PARAMS: &[&str] = &["parseTime", "loc", "charset", "collation", "timeout"];

/// Convert a datasource to a `mysql://` URL.
///
/// URLs pass through unchanged. Go DSNs (`user:pass@tcp(host:port)/db?params`)
/// are rewritten; parameters only the Go driver understands are dropped.
pub fn datasource_url(datasource: &str) -> Result<String> {
    if datasource.starts_with("mysql://") || datasource.starts_with("mariadb://") {
        return Ok(datasource.to_string());
    }

    let (credentials, rest) = match datasource.rsplit_once('@') {
        Some((creds, rest)) => (Some(creds), rest),
        None => (None, datasource),
    };

    let (address, path) = match rest.split_once('/') {
        Some((address, path)) => (address, path),
        None => (rest, ""),
    };

    let host = if let Some(inner) = address
        .strip_prefix("tcp(")
        .and_then(|a| a.strip_suffix(')'))
    {
        inner
    } else if address.is_empty() || address.starts_with("unix(") {
        return Err(MigrateError::Config(format!(
            "Unsupported MySQL datasource address '{}': expected tcp(host:port)",
            address
        )));
    } else {
        address
    };

    let (database, params) = match path.split_once('?') {
        Some((db, params)) => (db, params),
        None => (path, ""),
    };

    let kept: Vec<&str> = params
        .split('&')
        .filter(|p| !p.is_empty())
        .filter(|p| {
            let key = p.split('=').next().unwrap_or_default();
            !GO_ONLY_PARAMS.contains(&key)
        })
        .collect();

    let mut url = String::from("mysql://");
    if let Some(creds) = credentials {
        match creds.split_once(':') {
            Some((user, pass)) => {
                url.push_str(&urlencoding::encode(user));
                url.push(':');
                url.push_str(&urlencoding::encode(pass));
            }
            None => url.push_str(&urlencoding::encode(creds)),
        }
        url.push('@');
    }
    url.push_str(host);
    url.push('/');
    url.push_str(database);
    if !kept.is_empty() {
        url.push('?');
        url.push_str(&kept.join("&"));
    }
    Ok(url)
}

/// MySQL/MariaDB store backed by a sqlx pool.
pub struct MysqlStore {
    pool: MySqlPool,
    dialect: DialectImpl,
}

impl MysqlStore {
    /// Connect to a MySQL database.
    pub async fn connect(datasource: &str) -> Result<Self> {
        let url = datasource_url(datasource)?;
        let options = MySqlConnectOptions::from_str(&url)
            .map_err(|e| MigrateError::pool(e, "parsing MySQL datasource"))?;

        let pool = MySqlPoolOptions::new()
            .max_connections(4)
            .acquire_timeout(POOL_CONNECTION_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| MigrateError::pool(e, "creating MySQL pool"))?;

        let store = Self {
            pool,
            dialect: DialectImpl::Mysql(MysqlDialect::new()),
        };
        store.ping().await?;
        Ok(store)
    }
}

fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &'q [SqlValue],
) -> Query<'q, MySql, MySqlArguments> {
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

/// Decode a row by the reported column type.
fn decode_row(row: &MySqlRow) -> Result<Row> {
    let mut out = Row::with_capacity(row.len());
    for (i, column) in row.columns().iter().enumerate() {
        let name = column.name();
        let raw = row.try_get_raw(i)?;
        if raw.is_null() {
            out.push(name, SqlValue::Null);
            continue;
        }
        let type_name = raw.type_info().name().to_uppercase();
        let value = if type_name.contains("INT") || type_name == "BOOLEAN" || type_name == "YEAR" {
            SqlValue::I64(row.try_get_unchecked::<i64, _>(i)?)
        } else if type_name.contains("BLOB") || type_name.contains("BINARY") {
            SqlValue::Bytes(row.try_get_unchecked::<Vec<u8>, _>(i)?)
        } else {
            SqlValue::Text(row.try_get_unchecked::<String, _>(i)?)
        };
        out.push(name, value);
    }
    Ok(out)
}

#[async_trait]
impl Store for MysqlStore {
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
        debug!(rows = rows.len(), "MySQL query returned");
        rows.iter().map(decode_row).collect()
    }

    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(MysqlTransaction { tx }))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| MigrateError::pool(e, "testing MySQL connection"))?;
        Ok(())
    }
}

/// Open MySQL transaction. sqlx rolls back on drop.
struct MysqlTransaction {
    tx: sqlx::Transaction<'static, MySql>,
}

#[async_trait]
impl Transaction for MysqlTransaction {
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
