//! Best-effort follow-up passes over migrated repositories.
//!
//! - [`resolve_identifiers`]: replace placeholder `repo_uid` values with the
//!   provider's ids
//! - [`activate_repos`]: enable every repository on the Drone server
//!
//! Both passes handle one repository at a time and keep going after a
//! failure. Each repository's outcome is reported in a [`ResolutionReport`].

mod activation;
mod identifiers;

pub use activation::activate_repos;
pub use identifiers::resolve_identifiers;

use thiserror::Error;

use crate::core::traits::{Dialect, FromRow, Store};
use crate::core::value::{Row, SqlValue, Statement};
use crate::error::{MigrateError, Result};

/// Why one repository could not be processed.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("owner {user_id} not found")]
    OwnerNotFound { user_id: i64 },

    #[error("failed to get repository owner: {0}")]
    Owner(#[source] MigrateError),

    #[error("failed to get remote repository: {0}")]
    Remote(#[source] MigrateError),

    #[error("failed to update metadata: {0}")]
    Update(#[source] MigrateError),

    #[error("activation failed: {0}")]
    Activate(#[source] MigrateError),
}

/// Result for one repository.
#[derive(Debug)]
pub struct RepoOutcome {
    pub repo_id: i64,
    pub slug: String,
    pub result: std::result::Result<(), ItemError>,
}

impl RepoOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-repository outcomes of a best-effort pass, in processing order.
#[derive(Debug, Default)]
pub struct ResolutionReport {
    pub outcomes: Vec<RepoOutcome>,
}

impl ResolutionReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    /// Outcomes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &RepoOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    /// `Ok` when every repository succeeded, otherwise
    /// [`MigrateError::Incomplete`].
    pub fn into_result(self) -> Result<Self> {
        let failed = self.failures().count();
        if failed == 0 {
            Ok(self)
        } else {
            Err(MigrateError::Incomplete {
                failed,
                total: self.total(),
            })
        }
    }
}

/// A 1.x repository, reduced to what the passes need.
#[derive(Debug, Clone)]
pub(crate) struct TargetRepo {
    pub id: i64,
    pub user_id: i64,
    pub namespace: String,
    pub name: String,
    pub slug: String,
}

impl FromRow for TargetRepo {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.i64("repo_id")?,
            user_id: row.i64("repo_user_id")?,
            namespace: row.string("repo_namespace")?,
            name: row.string("repo_name")?,
            slug: row.string("repo_slug")?,
        })
    }
}

/// Credentials of a repository owner.
#[derive(Debug, Clone)]
pub(crate) struct Owner {
    pub login: String,
    pub token: String,
    pub hash: String,
}

/// Look up the owner of a repository.
pub(crate) async fn owner(target: &dyn Store, user_id: i64) -> std::result::Result<Owner, ItemError> {
    let stmt = Statement::with_params(
        format!(
            "SELECT user_login, user_oauth_token, user_hash FROM users WHERE user_id = {}",
            target.dialect().param_placeholder(1)
        ),
        vec![SqlValue::from(user_id)],
    );
    let rows = target.query(&stmt).await.map_err(ItemError::Owner)?;
    let row = rows.first().ok_or(ItemError::OwnerNotFound { user_id })?;

    let decode = |column: &str| row.string(column).map_err(ItemError::Owner);
    Ok(Owner {
        login: decode("user_login")?,
        token: decode("user_oauth_token")?,
        hash: decode("user_hash")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(repo_id: i64, result: std::result::Result<(), ItemError>) -> RepoOutcome {
        RepoOutcome {
            repo_id,
            slug: format!("octocat/repo-{repo_id}"),
            result,
        }
    }

    #[test]
    fn test_report_counts() {
        let report = ResolutionReport {
            outcomes: vec![
                outcome(5, Ok(())),
                outcome(9, Err(ItemError::OwnerNotFound { user_id: 2 })),
                outcome(11, Ok(())),
            ],
        };
        assert_eq!(report.total(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failures().map(|o| o.repo_id).collect::<Vec<_>>(), vec![9]);

        match report.into_result() {
            Err(MigrateError::Incomplete { failed, total }) => {
                assert_eq!((failed, total), (1, 3));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_report_is_ok() {
        assert!(ResolutionReport::default().into_result().is_ok());
    }
}
