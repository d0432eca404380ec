use async_trait::async_trait;
use tracing::debug;

use super::{check_status, http_client, CiServer};
use crate::error::{MigrateError, Result};

/// [`CiServer`] for the Drone 1.x API.
#[derive(Debug, Clone)]
pub struct DroneClient {
    base_url: String,
    client: reqwest::Client,
}

impl DroneClient {
    pub fn new(server: &str) -> Result<Self> {
        if server.is_empty() {
            return Err(MigrateError::Config("drone.server is required".into()));
        }
        Ok(Self {
            base_url: server.trim_end_matches('/').to_string(),
            client: http_client()?,
        })
    }

    fn repo_url(&self, namespace: &str, name: &str) -> String {
        format!("{}/api/repos/{}/{}", self.base_url, namespace, name)
    }
}

#[async_trait]
impl CiServer for DroneClient {
    async fn enable_repo(&self, token: &str, namespace: &str, name: &str) -> Result<()> {
        let url = self.repo_url(namespace, name);
        debug!(url = %url, "Activating repository");

        let response = self.client.post(&url).bearer_auth(token).send().await?;
        check_status(response)?;
        Ok(())
    }
}
