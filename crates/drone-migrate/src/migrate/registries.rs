use tracing::{debug, error};

use super::{extract, repo_ids, Progress, StepSummary};
use crate::core::traits::Store;
use crate::error::Result;
use crate::model::RegistryV0;
use crate::transfer;
use crate::transform::registry;

const REGISTRY_QUERY: &str = "\
SELECT repo_full_name, registry.*
FROM registry INNER JOIN repos ON repo_id = registry_repo_id
WHERE repo_user_id > 0
ORDER BY registry_id";

/// Fold registry credentials into one `.dockerconfigjson` secret per
/// repository.
///
/// Repositories missing in the target are skipped together with all their
/// credentials.
pub async fn migrate_registries(source: &dyn Store, target: &dyn Store) -> Result<StepSummary> {
    let mut progress = Progress::start("registries");

    let legacy: Vec<RegistryV0> = extract(source, REGISTRY_QUERY).await?;
    progress.extracted(legacy.len());

    let configs = registry::group(&legacy);
    let repos = repo_ids(target, configs.keys().map(String::as_str)).await?;

    let mut secrets = Vec::with_capacity(configs.len());
    for (slug, config) in &configs {
        let Some(&repo_id) = repos.get(slug) else {
            error!(repository = %slug, "Failed to get registry repository");
            progress.skip_many(config.auths.len());
            continue;
        };
        debug!(repository = %slug, registries = config.auths.len(), "Converting registries");
        secrets.push(registry::secret(config, repo_id)?);
    }

    let loaded = transfer::load(target, &secrets).await?;

    Ok(progress.finish(loaded))
}
