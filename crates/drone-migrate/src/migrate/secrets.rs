use tracing::{debug, error};

use super::{extract, repo_ids, Progress, StepSummary};
use crate::core::traits::Store;
use crate::error::Result;
use crate::model::SecretV0;
use crate::transfer;
use crate::transform;

const SECRET_QUERY: &str = "\
SELECT repo_full_name, secrets.*
FROM secrets INNER JOIN repos ON repo_id = secret_repo_id
WHERE secret_repo_id > 0
ORDER BY secret_id";

/// Copy repository secrets, keeping ids.
///
/// The owning repository is looked up by slug in the target, so repositories
/// must be migrated first. Secrets of repositories missing there are skipped.
pub async fn migrate_secrets(source: &dyn Store, target: &dyn Store) -> Result<StepSummary> {
    let mut progress = Progress::start("secrets");

    let legacy: Vec<SecretV0> = extract(source, SECRET_QUERY).await?;
    progress.extracted(legacy.len());

    let repos = repo_ids(target, legacy.iter().map(|s| s.repo_full_name.as_str())).await?;

    let mut secrets = Vec::with_capacity(legacy.len());
    for secret in &legacy {
        let Some(&repo_id) = repos.get(&secret.repo_full_name) else {
            error!(
                repository = %secret.repo_full_name,
                secret = %secret.name,
                "Failed to get secret repository"
            );
            progress.skip();
            continue;
        };
        debug!(repository = %secret.repo_full_name, secret = %secret.name, "Converting secret");
        secrets.push(transform::secret(secret, repo_id));
    }

    let loaded = transfer::load(target, &secrets).await?;
    Ok(progress.finish(loaded))
}
