//! Configuration type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
///
/// Every section is optional; each step asks for the sections it needs
/// through the `require_*` accessors.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Legacy (0.8) database, opened read-only.
    #[serde(default)]
    pub source: Option<DatabaseConfig>,

    /// New (1.x) database.
    #[serde(default)]
    pub target: Option<DatabaseConfig>,

    /// Source control management provider.
    #[serde(default)]
    pub scm: Option<ScmConfig>,

    /// Drone 1.x server used for repository activation.
    #[serde(default)]
    pub drone: Option<DroneConfig>,

    /// S3-compatible log storage.
    #[serde(default)]
    pub s3: Option<S3Config>,

    /// 32-byte secret encryption key.
    #[serde(default)]
    pub encryption_key: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("scm", &self.scm)
            .field("drone", &self.drone)
            .field("s3", &self.s3)
            .field(
                "encryption_key",
                &self.encryption_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Database connection configuration.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Driver name: sqlite3, postgres or mysql.
    pub driver: String,

    /// Driver-specific datasource (file path, URL or DSN).
    pub datasource: String,

    /// PostgreSQL TLS mode; overrides the datasource `sslmode` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_mode: Option<String>,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("driver", &self.driver)
            .field("datasource", &"[REDACTED]")
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

/// Source control management provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScmConfig {
    /// Provider kind: github, gitlab, gitea or gogs.
    pub driver: String,

    /// Provider base address. Defaults per provider when empty.
    #[serde(default)]
    pub server: String,
}

/// Drone server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DroneConfig {
    /// Server address, e.g. `https://drone.example.com`.
    pub server: String,
}

/// S3 log storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct S3Config {
    /// Bucket name.
    pub bucket: String,

    /// Key prefix.
    #[serde(default)]
    pub prefix: String,

    /// Custom endpoint for S3-compatible services.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Path-style addressing (`endpoint/bucket/key`).
    #[serde(default)]
    pub path_style: bool,
}

/// Values supplied on the command line or through the environment.
///
/// Each `Some` replaces the corresponding configuration value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source_driver: Option<String>,
    pub source_datasource: Option<String>,
    pub target_driver: Option<String>,
    pub target_datasource: Option<String>,
    pub target_ssl_mode: Option<String>,
    pub scm_driver: Option<String>,
    pub scm_server: Option<String>,
    pub drone_server: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_prefix: Option<String>,
    pub s3_endpoint: Option<String>,
    pub s3_path_style: Option<bool>,
    pub encryption_key: Option<String>,
}
