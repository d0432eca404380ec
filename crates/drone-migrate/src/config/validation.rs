//! Per-step configuration requirements.
//!
//! Steps call these before opening any connection so that a missing setting
//! fails fast with a configuration error.

use super::{Config, DatabaseConfig, DroneConfig, S3Config, ScmConfig};
use crate::drivers::Driver;
use crate::error::{MigrateError, Result};

/// Required length of the secret encryption key in bytes.
pub const ENCRYPTION_KEY_LEN: usize = 32;

impl Config {
    /// Source database settings.
    pub fn require_source(&self) -> Result<&DatabaseConfig> {
        require_database(self.source.as_ref(), "source")
    }

    /// Target database settings.
    pub fn require_target(&self) -> Result<&DatabaseConfig> {
        require_database(self.target.as_ref(), "target")
    }

    /// Source control settings.
    pub fn require_scm(&self) -> Result<&ScmConfig> {
        let scm = self
            .scm
            .as_ref()
            .ok_or_else(|| MigrateError::Config("scm.driver is required".into()))?;
        if scm.driver.is_empty() {
            return Err(MigrateError::Config("scm.driver is required".into()));
        }
        Ok(scm)
    }

    /// Drone server settings.
    pub fn require_drone(&self) -> Result<&DroneConfig> {
        match &self.drone {
            Some(drone) if !drone.server.is_empty() => Ok(drone),
            _ => Err(MigrateError::Config("drone.server is required".into())),
        }
    }

    /// S3 settings.
    pub fn require_s3(&self) -> Result<&S3Config> {
        match &self.s3 {
            Some(s3) if !s3.bucket.is_empty() => Ok(s3),
            _ => Err(MigrateError::Config("s3.bucket is required".into())),
        }
    }

    /// Secret encryption key, exactly [`ENCRYPTION_KEY_LEN`] bytes.
    pub fn require_encryption_key(&self) -> Result<&[u8]> {
        let key = self
            .encryption_key
            .as_deref()
            .ok_or_else(|| MigrateError::Config("encryption_key is required".into()))?;
        if key.len() != ENCRYPTION_KEY_LEN {
            return Err(MigrateError::KeySize(key.len()));
        }
        Ok(key.as_bytes())
    }
}

fn require_database<'a>(
    config: Option<&'a DatabaseConfig>,
    section: &str,
) -> Result<&'a DatabaseConfig> {
    let config = config
        .ok_or_else(|| MigrateError::Config(format!("{}.driver is required", section)))?;
    if config.driver.is_empty() {
        return Err(MigrateError::Config(format!("{}.driver is required", section)));
    }
    if config.datasource.is_empty() {
        return Err(MigrateError::Config(format!(
            "{}.datasource is required",
            section
        )));
    }
    Driver::parse(&config.driver)?;
    Ok(config)
}
