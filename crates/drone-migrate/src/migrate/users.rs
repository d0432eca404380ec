use tracing::debug;

use super::{extract, now, Progress, StepSummary};
use crate::core::traits::Store;
use crate::error::Result;
use crate::model::UserV0;
use crate::transfer;
use crate::transform;

const USER_QUERY: &str = "SELECT * FROM users ORDER BY user_id";

/// Copy every 0.x user, keeping ids.
pub async fn migrate_users(source: &dyn Store, target: &dyn Store) -> Result<StepSummary> {
    let mut progress = Progress::start("users");

    let legacy: Vec<UserV0> = extract(source, USER_QUERY).await?;
    progress.extracted(legacy.len());

    let now = now();
    let users: Vec<_> = legacy
        .iter()
        .map(|user| {
            debug!(login = %user.login, id = user.id, "Converting user");
            transform::user(user, now)
        })
        .collect();

    let loaded = transfer::load(target, &users).await?;
    Ok(progress.finish(loaded))
}
