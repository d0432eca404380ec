//! Transactional loader for 1.x records.
//!
//! A [`Batch`] wraps one target transaction. Records are inserted one at a
//! time; if any insert fails the batch is rolled back and nothing from it
//! becomes visible. After explicit-id inserts the batch advances the
//! table's identifier sequence inside the same transaction, so a rollback
//! also undoes the sequence change.

use tracing::{debug, error, info, warn};

use crate::core::traits::{Dialect, Record, Store, Transaction};
use crate::core::value::{SqlValue, Statement};
use crate::drivers::DialectImpl;
use crate::error::{MigrateError, Result};

/// INSERT statement for a record in the placeholder style of `dialect`.
pub fn insert_statement<R: Record>(dialect: &impl Dialect, record: &R) -> Statement {
    let mut columns = Vec::with_capacity(R::COLUMNS.len() + 1);
    let mut params: Vec<SqlValue> = Vec::with_capacity(R::COLUMNS.len() + 1);

    if let Some(id) = record.id() {
        columns.push(R::ID_COLUMN);
        params.push(id.into());
    }
    columns.extend_from_slice(R::COLUMNS);
    params.extend(record.values());

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        R::TABLE,
        columns.join(", "),
        dialect.placeholders(params.len())
    );
    Statement::with_params(sql, params)
}

/// Largest explicit id among `records`.
pub fn max_id<R: Record>(records: &[R]) -> Option<i64> {
    records.iter().filter_map(Record::id).max()
}

/// One all-or-nothing unit of work on the target database.
pub struct Batch {
    tx: Box<dyn Transaction>,
    dialect: DialectImpl,
    inserted: u64,
}

impl Batch {
    /// Open a transaction on `target`.
    pub async fn begin(target: &dyn Store) -> Result<Self> {
        let tx = target.begin().await?;
        Ok(Self {
            tx,
            dialect: target.dialect().clone(),
            inserted: 0,
        })
    }

    /// Insert one record.
    pub async fn insert<R: Record>(&mut self, record: &R) -> Result<()> {
        let stmt = insert_statement(&self.dialect, record);
        if let Err(e) = self.tx.execute(&stmt).await {
            error!(table = R::TABLE, id = ?record.id(), error = %e, "Insert failed");
            return Err(e);
        }
        self.inserted += 1;
        Ok(())
    }

    /// Insert every record, then advance the table's sequence past the
    /// largest explicit id.
    pub async fn insert_all<R: Record>(&mut self, records: &[R]) -> Result<u64> {
        for record in records {
            self.insert(record).await?;
        }
        if let Some(max) = max_id(records) {
            self.reconcile_sequence(R::TABLE, R::ID_COLUMN, max).await?;
        }
        Ok(records.len() as u64)
    }

    /// Make the next generated id of `table.column` equal `max_id + 1`.
    ///
    /// Returns false when the backend has no separate sequence to reset.
    pub async fn reconcile_sequence(
        &mut self,
        table: &str,
        column: &str,
        max_id: i64,
    ) -> Result<bool> {
        let next = max_id.checked_add(1).ok_or_else(|| {
            MigrateError::transform(table, format!("{} {} leaves no next id", column, max_id))
        })?;
        let Some(sql) = self.dialect.reset_sequence(table, column, next) else {
            return Ok(false);
        };
        if let Err(e) = self.tx.execute(&Statement::new(sql)).await {
            error!(table, error = %e, "Failed to reset sequence");
            return Err(e);
        }
        debug!(table, next, "Reset sequence");
        Ok(true)
    }

    /// Commit and return the number of inserted rows.
    pub async fn commit(self) -> Result<u64> {
        self.tx.commit().await?;
        Ok(self.inserted)
    }

    /// Roll back every statement of the batch.
    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await
    }

    /// Roll back and hand back `err`. A failing rollback is only logged, the
    /// transaction is discarded with its connection either way.
    pub async fn abort<T>(self, err: MigrateError) -> Result<T> {
        if let Err(rollback) = self.rollback().await {
            warn!(error = %rollback, "Rollback failed");
        }
        Err(err)
    }
}

/// Insert `records` in one transaction and reconcile their sequence.
///
/// Returns the number of inserted rows. On failure nothing is committed.
pub async fn load<R: Record>(target: &dyn Store, records: &[R]) -> Result<u64> {
    let mut batch = Batch::begin(target).await?;
    if let Err(e) = batch.insert_all(records).await {
        return batch.abort(e).await;
    }
    let count = batch.commit().await?;
    info!(table = R::TABLE, rows = count, "Loaded records");
    Ok(count)
}
