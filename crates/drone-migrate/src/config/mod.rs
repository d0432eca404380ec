//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;
pub use validation::ENCRYPTION_KEY_LEN;

use std::path::Path;

use crate::error::Result;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Apply command line / environment overrides.
    pub fn apply(mut self, overrides: Overrides) -> Self {
        if overrides.source_driver.is_some() || overrides.source_datasource.is_some() {
            let source = self.source.get_or_insert_with(DatabaseConfig::default);
            set(&mut source.driver, overrides.source_driver);
            set(&mut source.datasource, overrides.source_datasource);
        }

        if overrides.target_driver.is_some()
            || overrides.target_datasource.is_some()
            || overrides.target_ssl_mode.is_some()
        {
            let target = self.target.get_or_insert_with(DatabaseConfig::default);
            set(&mut target.driver, overrides.target_driver);
            set(&mut target.datasource, overrides.target_datasource);
            if overrides.target_ssl_mode.is_some() {
                target.ssl_mode = overrides.target_ssl_mode;
            }
        }

        if overrides.scm_driver.is_some() || overrides.scm_server.is_some() {
            let scm = self.scm.get_or_insert_with(ScmConfig::default);
            set(&mut scm.driver, overrides.scm_driver);
            set(&mut scm.server, overrides.scm_server);
        }

        if let Some(server) = overrides.drone_server {
            self.drone = Some(DroneConfig { server });
        }

        if overrides.s3_bucket.is_some()
            || overrides.s3_prefix.is_some()
            || overrides.s3_endpoint.is_some()
            || overrides.s3_path_style.is_some()
        {
            let s3 = self.s3.get_or_insert_with(S3Config::default);
            set(&mut s3.bucket, overrides.s3_bucket);
            set(&mut s3.prefix, overrides.s3_prefix);
            if overrides.s3_endpoint.is_some() {
                s3.endpoint = overrides.s3_endpoint;
            }
            if let Some(path_style) = overrides.s3_path_style {
                s3.path_style = path_style;
            }
        }

        if overrides.encryption_key.is_some() {
            self.encryption_key = overrides.encryption_key;
        }

        self
    }
}

fn set(field: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *field = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml_sections() {
        let yaml = r#"
source:
  driver: sqlite3
  datasource: /var/lib/drone/drone.sqlite
target:
  driver: postgres
  datasource: postgres://drone:secret@db/drone
  ssl_mode: verify-full
scm:
  driver: github
s3:
  bucket: logs
  path_style: true
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.source.as_ref().unwrap().driver, "sqlite3");
        assert_eq!(
            config.target.as_ref().unwrap().ssl_mode.as_deref(),
            Some("verify-full")
        );
        assert_eq!(config.scm.as_ref().unwrap().server, "");
        assert!(config.s3.as_ref().unwrap().path_style);
        assert!(config.drone.is_none());
    }

    #[test]
    fn test_overrides_replace_and_create_sections() {
        let yaml = r#"
target:
  driver: sqlite3
  datasource: old.sqlite
"#;
        let config = Config::from_yaml(yaml).unwrap().apply(Overrides {
            target_datasource: Some("new.sqlite".into()),
            drone_server: Some("https://drone.example.com".into()),
            ..Default::default()
        });

        let target = config.target.unwrap();
        assert_eq!(target.driver, "sqlite3");
        assert_eq!(target.datasource, "new.sqlite");
        assert_eq!(config.drone.unwrap().server, "https://drone.example.com");
        assert!(config.source.is_none());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::default().apply(Overrides {
            target_driver: Some("postgres".into()),
            target_datasource: Some("postgres://drone:hunter2@db/drone".into()),
            encryption_key: Some("0123456789abcdef0123456789abcdef".into()),
            ..Default::default()
        });
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("0123456789abcdef"));
        assert!(debug.contains("REDACTED"));
    }
}
