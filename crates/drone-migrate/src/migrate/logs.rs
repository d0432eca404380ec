use tracing::{debug, error, warn};

use super::{extract, Progress, StepSummary};
use crate::core::traits::{Dialect, FromRow, Store};
use crate::core::value::{Row, SqlValue, Statement};
use crate::error::Result;
use crate::model::LogV1;
use crate::storage::{log_key, BlobStore};
use crate::transfer::Batch;

/// Ids of the steps whose logs are eligible.
const STEP_QUERY: &str = "\
SELECT procs.proc_id
FROM procs
INNER JOIN builds ON procs.proc_build_id = builds.build_id
INNER JOIN repos ON builds.build_repo_id = repos.repo_id
WHERE procs.proc_ppid != 0
  AND repos.repo_user_id > 0
ORDER BY procs.proc_id";

struct StepId(i64);

impl FromRow for StepId {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(StepId(row.i64("proc_id")?))
    }
}

/// Log blob of one step, or `None` when the step has no usable log.
///
/// A missing log is normal for steps that never ran. A log that cannot be
/// read is skipped with a warning.
async fn read_log(source: &dyn Store, step_id: i64) -> Option<Vec<u8>> {
    let stmt = Statement::with_params(
        format!(
            "SELECT log_data FROM logs WHERE log_job_id = {}",
            source.dialect().param_placeholder(1)
        ),
        vec![SqlValue::from(step_id)],
    );

    let rows = match source.query(&stmt).await {
        Ok(rows) => rows,
        Err(e) => {
            warn!(step = step_id, error = %e, "Cannot read logs for step");
            return None;
        }
    };
    let Some(row) = rows.first() else {
        debug!(step = step_id, "No logs for step");
        return None;
    };
    match row.bytes("log_data") {
        Ok(data) => Some(data),
        Err(e) => {
            warn!(step = step_id, error = %e, "Cannot decode logs for step");
            None
        }
    }
}

/// Copy step logs into the 1.x `logs` table, keyed by step id.
///
/// Logs are read and inserted one step at a time inside one transaction.
pub async fn migrate_logs(source: &dyn Store, target: &dyn Store) -> Result<StepSummary> {
    let mut progress = Progress::start("logs");

    let steps: Vec<StepId> = extract(source, STEP_QUERY).await?;
    progress.extracted(steps.len());

    let mut batch = Batch::begin(target).await?;
    for StepId(id) in steps {
        let Some(data) = read_log(source, id).await else {
            progress.skip();
            continue;
        };
        if let Err(e) = batch.insert(&LogV1 { id, data }).await {
            return batch.abort(e).await;
        }
    }
    let loaded = batch.commit().await?;

    Ok(progress.finish(loaded))
}

/// Upload step logs to object storage under `/<prefix>/<step id>`.
///
/// Uploads are not transactional. The first failing upload stops the step;
/// objects written before it stay in place.
pub async fn migrate_logs_to_storage(
    source: &dyn Store,
    storage: &dyn BlobStore,
    prefix: &str,
) -> Result<StepSummary> {
    let mut progress = Progress::start("logs");

    let steps: Vec<StepId> = extract(source, STEP_QUERY).await?;
    progress.extracted(steps.len());

    let mut uploaded = 0;
    for StepId(id) in steps {
        let Some(data) = read_log(source, id).await else {
            progress.skip();
            continue;
        };

        let key = log_key(prefix, id);
        if let Err(e) = storage.upload(&key, &data).await {
            error!(step = id, key = %key, error = %e, "Upload failed");
            return Err(e);
        }
        uploaded += 1;
    }

    Ok(progress.finish(uploaded))
}
