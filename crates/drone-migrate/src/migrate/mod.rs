//! Operator steps that move one resource kind from 0.x to 1.x.
//!
//! Every step reads from the source, transforms in memory and writes the
//! whole result in one target transaction, then returns a [`StepSummary`].
//! Steps never call each other; the operator runs them in dependency order
//! (users, repos, builds, stages, logs, secrets, registries).

mod builds;
mod encrypt;
mod logs;
mod registries;
mod repos;
mod secrets;
mod stages;
mod users;

pub use builds::migrate_builds;
pub use encrypt::encrypt_secrets;
pub use logs::{migrate_logs, migrate_logs_to_storage};
pub use registries::migrate_registries;
pub use repos::migrate_repos;
pub use secrets::migrate_secrets;
pub use stages::migrate_stages;
pub use users::migrate_users;

use std::collections::HashMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::traits::{Dialect, FromRow, Store};
use crate::core::value::{SqlValue, Statement};
use crate::error::Result;

/// Outcome of one migration step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepSummary {
    /// Resource kind, e.g. `repos`.
    pub resource: String,

    /// Rows read from the source.
    pub extracted: u64,

    /// Rows written to the target.
    pub loaded: u64,

    /// Source rows left behind.
    pub skipped: u64,

    /// Wall-clock duration in seconds.
    pub duration_seconds: f64,
}

impl StepSummary {
    /// Convert to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Counts and timing of a running step.
pub(crate) struct Progress {
    resource: &'static str,
    started: Instant,
    extracted: u64,
    skipped: u64,
}

impl Progress {
    pub(crate) fn start(resource: &'static str) -> Self {
        info!(resource, "Starting migration");
        Self {
            resource,
            started: Instant::now(),
            extracted: 0,
            skipped: 0,
        }
    }

    pub(crate) fn extracted(&mut self, count: usize) {
        self.extracted += count as u64;
        info!(resource = self.resource, rows = count, "Extracted rows");
    }

    pub(crate) fn skip(&mut self) {
        self.skipped += 1;
    }

    pub(crate) fn skip_many(&mut self, count: usize) {
        self.skipped += count as u64;
    }

    pub(crate) fn finish(self, loaded: u64) -> StepSummary {
        let summary = StepSummary {
            resource: self.resource.to_string(),
            extracted: self.extracted,
            loaded,
            skipped: self.skipped,
            duration_seconds: self.started.elapsed().as_secs_f64(),
        };
        info!(
            resource = self.resource,
            extracted = summary.extracted,
            loaded = summary.loaded,
            skipped = summary.skipped,
            "Migration complete"
        );
        summary
    }
}

/// Run a query on the source and decode every row.
pub(crate) async fn extract<T: FromRow>(source: &dyn Store, sql: &str) -> Result<Vec<T>> {
    source
        .query(&Statement::new(sql))
        .await?
        .iter()
        .map(T::from_row)
        .collect()
}

/// Migration timestamp in Unix seconds.
pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Map of 1.x repository slugs to ids for the given slugs.
///
/// Queried once per slug before any transaction is opened. Slugs without a
/// repository are absent from the map.
pub(crate) async fn repo_ids<'a>(
    target: &dyn Store,
    slugs: impl IntoIterator<Item = &'a str>,
) -> Result<HashMap<String, i64>> {
    let sql = format!(
        "SELECT repo_id FROM repos WHERE repo_slug = {}",
        target.dialect().param_placeholder(1)
    );

    let mut ids = HashMap::new();
    for slug in slugs {
        if ids.contains_key(slug) {
            continue;
        }
        let stmt = Statement::with_params(sql.as_str(), vec![SqlValue::from(slug)]);
        if let Some(row) = target.query(&stmt).await?.first() {
            ids.insert(slug.to_string(), row.i64("repo_id")?);
        }
    }
    Ok(ids)
}
