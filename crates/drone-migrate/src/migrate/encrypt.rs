use tracing::{debug, error, warn};

use super::{Progress, StepSummary};
use crate::core::traits::{Dialect, Store};
use crate::core::value::{SqlValue, Statement};
use crate::crypto::SecretCipher;
use crate::error::Result;

/// Encrypt every 1.x secret in place.
///
/// The key is checked before any row is read. All updates run in one
/// transaction; a failure leaves every secret as it was.
pub async fn encrypt_secrets(target: &dyn Store, key: &[u8]) -> Result<StepSummary> {
    let cipher = SecretCipher::new(key)?;
    let mut progress = Progress::start("secrets");

    let rows = target
        .query(&Statement::new(
            "SELECT secret_id, secret_data FROM secrets ORDER BY secret_id",
        ))
        .await?;
    progress.extracted(rows.len());

    let mut sealed = Vec::with_capacity(rows.len());
    for row in &rows {
        let id = row.i64("secret_id")?;
        let plaintext = row.bytes("secret_data")?;
        sealed.push((id, cipher.encrypt(&plaintext)?));
    }

    let dialect = target.dialect();
    let sql = format!(
        "UPDATE secrets SET secret_data = {} WHERE secret_id = {}",
        dialect.param_placeholder(1),
        dialect.param_placeholder(2)
    );

    let mut tx = target.begin().await?;
    for (id, data) in sealed {
        let stmt = Statement::with_params(sql.as_str(), vec![SqlValue::Bytes(data), id.into()]);
        if let Err(e) = tx.execute(&stmt).await {
            error!(id, error = %e, "Failed to update secret");
            if let Err(rollback) = tx.rollback().await {
                warn!(error = %rollback, "Rollback failed");
            }
            return Err(e);
        }
        debug!(id, "Encrypted secret");
    }
    tx.commit().await?;

    Ok(progress.finish(rows.len() as u64))
}
