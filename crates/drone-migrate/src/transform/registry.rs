//! Registry credentials as `.dockerconfigjson` secrets.
//!
//! 1.x has no registry table. All credentials of a repository are folded
//! into one secret holding a Docker config document:
//!
//! ```json
//! {"auths":{"index.docker.io":{"auth":"b2N0b2NhdDpzZWNyZXQ=","email":"octocat@github.com"}}}
//! ```

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;

use crate::error::Result;
use crate::model::{RegistryV0, SecretV1};

/// Name of the secret holding the Docker config.
pub const DOCKER_CONFIG_SECRET: &str = ".dockerconfigjson";

/// Docker config document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DockerConfig {
    pub auths: BTreeMap<String, AuthConfig>,
}

/// Credentials for one registry address.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthConfig {
    /// base64 of `username:password`.
    pub auth: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
}

impl AuthConfig {
    pub fn new(username: &str, password: &str, email: &str) -> Self {
        Self {
            auth: STANDARD.encode(format!("{}:{}", username, password)),
            email: email.to_string(),
        }
    }
}

/// Group registry rows by repository slug.
///
/// A later row for the same address replaces an earlier one.
pub fn group(registries: &[RegistryV0]) -> BTreeMap<String, DockerConfig> {
    let mut configs: BTreeMap<String, DockerConfig> = BTreeMap::new();
    for registry in registries {
        configs
            .entry(registry.repo_full_name.clone())
            .or_default()
            .auths
            .insert(
                registry.addr.clone(),
                AuthConfig::new(&registry.username, &registry.password, &registry.email),
            );
    }
    configs
}

/// Secret for a repository's Docker config. The id is left to the backend.
pub fn secret(config: &DockerConfig, repo_id: i64) -> Result<SecretV1> {
    Ok(SecretV1 {
        id: None,
        repo_id,
        name: DOCKER_CONFIG_SECRET.to_string(),
        data: serde_json::to_string(config)?,
        pull_request: true,
        pull_request_push: false,
    })
}
