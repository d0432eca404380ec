use tracing::info;

use super::{extract, Progress, StepSummary};
use crate::core::traits::Store;
use crate::error::Result;
use crate::model::ProcessV0;
use crate::transfer::Batch;
use crate::transform::hierarchy;

/// Every process of every build of an owned repository, stages and steps
/// alike. The build's repository id rides along for the stage rows.
const PROCESS_QUERY: &str = "\
SELECT procs.*, builds.build_repo_id
FROM procs
INNER JOIN builds ON procs.proc_build_id = builds.build_id
INNER JOIN repos ON builds.build_repo_id = repos.repo_id
WHERE repos.repo_user_id > 0
ORDER BY procs.proc_id";

/// Split 0.x processes into 1.x stages and steps.
///
/// Both tables are written in one transaction. A step whose stage cannot be
/// found fails the step before anything is written.
pub async fn migrate_stages(source: &dyn Store, target: &dyn Store) -> Result<StepSummary> {
    let mut progress = Progress::start("stages");

    let processes: Vec<ProcessV0> = extract(source, PROCESS_QUERY).await?;
    progress.extracted(processes.len());

    let tree = hierarchy::split(&processes)?;
    info!(
        stages = tree.stages.len(),
        steps = tree.steps.len(),
        "Resolved process tree"
    );

    let mut batch = Batch::begin(target).await?;
    if let Err(e) = batch.insert_all(&tree.stages).await {
        return batch.abort(e).await;
    }
    if let Err(e) = batch.insert_all(&tree.steps).await {
        return batch.abort(e).await;
    }
    let loaded = batch.commit().await?;

    Ok(progress.finish(loaded))
}
