//! Clients for the services a migration talks to besides the databases.
//!
//! - [`ScmClient`]: source control provider, used to resolve repository ids
//! - [`CiServer`]: the Drone 1.x server, used to activate repositories
//!
//! Credentials are passed on every call. A client holds a connection pool
//! and a base address, never a user token.

mod drone;
mod scm;

pub use drone::DroneClient;
pub use scm::{HttpScmClient, ScmKind};

use async_trait::async_trait;

use crate::config::{DroneConfig, ScmConfig};
use crate::error::{MigrateError, Result};

/// A repository as known to the source control provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepo {
    /// Provider's durable identifier.
    pub id: String,

    /// SSH clone address.
    pub clone_ssh: String,
}

/// Source control provider.
#[async_trait]
pub trait ScmClient: Send + Sync {
    /// Look up a repository by namespace and name, authenticating as the
    /// holder of `token`.
    async fn find_repo(&self, token: &str, namespace: &str, name: &str) -> Result<RemoteRepo>;
}

/// CI server repository management.
#[async_trait]
pub trait CiServer: Send + Sync {
    /// Activate a repository, authenticating as the holder of `token`.
    async fn enable_repo(&self, token: &str, namespace: &str, name: &str) -> Result<()>;
}

/// Source control client for the configured provider.
///
/// # Errors
///
/// Returns a configuration error for unknown providers and for Bitbucket
/// Server (`stash`), whose OAuth1 request signing is not supported.
pub fn scm_client(config: &ScmConfig) -> Result<Box<dyn ScmClient>> {
    let kind = ScmKind::parse(&config.driver)?;
    Ok(Box::new(HttpScmClient::new(kind, &config.server)?))
}

/// Drone server client.
pub fn ci_server(config: &DroneConfig) -> Result<Box<dyn CiServer>> {
    Ok(Box::new(DroneClient::new(&config.server)?))
}

pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("drone-migrate/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .map_err(MigrateError::from)
}

/// Fail with [`MigrateError::RemoteStatus`] unless the response succeeded.
pub(crate) fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(MigrateError::RemoteStatus {
            url: response.url().to_string(),
            status: status.as_u16(),
        })
    }
}
