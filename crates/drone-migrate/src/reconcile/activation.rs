use tracing::{debug, error, info};

use super::{owner, ItemError, RepoOutcome, ResolutionReport, TargetRepo};
use crate::core::traits::Store;
use crate::error::Result;
use crate::migrate;
use crate::remote::CiServer;

const REPO_QUERY: &str = "\
SELECT repo_id, repo_user_id, repo_namespace, repo_name, repo_slug
FROM repos
ORDER BY repo_id";

/// Enable every 1.x repository on the Drone server.
///
/// Each call authenticates with the owner's `user_hash`. Activation creates
/// the webhooks and fills in the remaining repository settings on the
/// server side.
pub async fn activate_repos(target: &dyn Store, server: &dyn CiServer) -> Result<ResolutionReport> {
    let repos: Vec<TargetRepo> = migrate::extract(target, REPO_QUERY).await?;
    info!(repositories = repos.len(), "Begin repository activation");

    let mut report = ResolutionReport::default();
    for repo in repos {
        let result = activate_one(target, server, &repo).await;
        if let Err(e) = &result {
            error!(repository = %repo.slug, error = %e, "Activation failed");
        }
        report.outcomes.push(RepoOutcome {
            repo_id: repo.id,
            slug: repo.slug,
            result,
        });
    }

    info!(
        succeeded = report.succeeded(),
        failed = report.total() - report.succeeded(),
        "Repository activation complete"
    );
    Ok(report)
}

async fn activate_one(
    target: &dyn Store,
    server: &dyn CiServer,
    repo: &TargetRepo,
) -> std::result::Result<(), ItemError> {
    debug!(repository = %repo.slug, "Activating repository");
    let owner = owner(target, repo.user_id).await?;

    server
        .enable_repo(&owner.hash, &repo.namespace, &repo.name)
        .await
        .map_err(ItemError::Activate)?;

    debug!(repository = %repo.slug, owner = %owner.login, "Activated repository");
    Ok(())
}
