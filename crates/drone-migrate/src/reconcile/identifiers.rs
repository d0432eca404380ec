use tracing::{debug, error, info};

use super::{owner, ItemError, RepoOutcome, ResolutionReport, TargetRepo};
use crate::core::traits::{Dialect, FromRow, Store};
use crate::core::value::{SqlValue, Statement};
use crate::error::Result;
use crate::remote::ScmClient;
use crate::transform::{is_placeholder_uid, PLACEHOLDER_PREFIX};

/// Replace placeholder repository ids with the ids known to the provider.
///
/// Every repository whose `repo_uid` is still a placeholder is looked up with
/// its owner's token. A successful lookup is written back immediately, on its
/// own, so a later failure never undoes it.
///
/// # Errors
///
/// Only listing the repositories can fail the call. Per-repository failures
/// are reported in the returned [`ResolutionReport`].
pub async fn resolve_identifiers(
    target: &dyn Store,
    scm: &dyn ScmClient,
) -> Result<ResolutionReport> {
    let dialect = target.dialect();
    let list = Statement::with_params(
        format!(
            "SELECT repo_id, repo_user_id, repo_namespace, repo_name, repo_slug, repo_uid \
             FROM repos WHERE repo_uid LIKE {} ORDER BY repo_id",
            dialect.param_placeholder(1)
        ),
        vec![SqlValue::from(format!("{}%", PLACEHOLDER_PREFIX))],
    );

    let mut repos = Vec::new();
    for row in target.query(&list).await? {
        // LIKE treats '_' as a wildcard.
        if is_placeholder_uid(&row.string("repo_uid")?) {
            repos.push(TargetRepo::from_row(&row)?);
        }
    }
    info!(repositories = repos.len(), "Updating repository metadata");

    let update_sql = format!(
        "UPDATE repos SET repo_uid = {}, repo_ssh_url = {} WHERE repo_id = {}",
        dialect.param_placeholder(1),
        dialect.param_placeholder(2),
        dialect.param_placeholder(3)
    );

    let mut report = ResolutionReport::default();
    for repo in repos {
        let result = resolve_one(target, scm, &repo, &update_sql).await;
        if let Err(e) = &result {
            error!(repository = %repo.slug, error = %e, "Failed to update repository metadata");
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
        "Repository metadata update complete"
    );
    Ok(report)
}

async fn resolve_one(
    target: &dyn Store,
    scm: &dyn ScmClient,
    repo: &TargetRepo,
    update_sql: &str,
) -> std::result::Result<(), ItemError> {
    debug!(repository = %repo.slug, "Updating metadata");
    let owner = owner(target, repo.user_id).await?;

    let remote = scm
        .find_repo(&owner.token, &repo.namespace, &repo.name)
        .await
        .map_err(ItemError::Remote)?;

    let stmt = Statement::with_params(
        update_sql,
        vec![remote.id.as_str().into(), remote.clone_ssh.into(), repo.id.into()],
    );
    target.execute(&stmt).await.map_err(ItemError::Update)?;

    debug!(repository = %repo.slug, owner = %owner.login, uid = %remote.id, "Updated metadata");
    Ok(())
}
