use tracing::debug;

use super::{extract, Progress, StepSummary};
use crate::core::traits::Store;
use crate::error::Result;
use crate::model::BuildV0;
use crate::transfer;
use crate::transform;

const BUILD_QUERY: &str = "\
SELECT builds.*
FROM builds INNER JOIN repos ON builds.build_repo_id = repos.repo_id
WHERE repos.repo_user_id > 0
ORDER BY builds.build_id";

/// Copy the builds of every owned repository, keeping ids.
pub async fn migrate_builds(source: &dyn Store, target: &dyn Store) -> Result<StepSummary> {
    let mut progress = Progress::start("builds");

    let legacy: Vec<BuildV0> = extract(source, BUILD_QUERY).await?;
    progress.extracted(legacy.len());

    let builds = legacy
        .iter()
        .map(|build| {
            debug!(build = build.id, repo = build.repo_id, "Converting build");
            transform::build(build)
        })
        .collect::<Result<Vec<_>>>()?;

    let loaded = transfer::load(target, &builds).await?;
    Ok(progress.finish(loaded))
}
