use tracing::debug;

use super::{extract, now, Progress, StepSummary};
use crate::core::traits::Store;
use crate::error::Result;
use crate::model::RepoV0;
use crate::transfer;
use crate::transform;

/// Repositories with an owner. Rows owned by user 0 are system entries.
const REPO_QUERY: &str = "SELECT * FROM repos WHERE repo_user_id > 0 ORDER BY repo_id";

/// Copy every owned 0.x repository, keeping ids.
///
/// Each repository gets a placeholder `uid`; run
/// [`resolve_identifiers`](crate::reconcile::resolve_identifiers) afterwards
/// to replace it.
pub async fn migrate_repos(source: &dyn Store, target: &dyn Store) -> Result<StepSummary> {
    let mut progress = Progress::start("repos");

    let legacy: Vec<RepoV0> = extract(source, REPO_QUERY).await?;
    progress.extracted(legacy.len());

    let now = now();
    let repos: Vec<_> = legacy
        .iter()
        .map(|repo| {
            debug!(repository = %repo.full_name, id = repo.id, "Converting repository");
            transform::repo(repo, now)
        })
        .collect();

    let loaded = transfer::load(target, &repos).await?;
    Ok(progress.finish(loaded))
}
