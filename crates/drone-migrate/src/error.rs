//! Error types for the migration library.

use thiserror::Error;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, missing fields, unknown driver, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection pool error with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// SQLite or MySQL error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// PostgreSQL error
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// A row could not be decoded into the expected shape
    #[error("Decode error for column {column}: {message}")]
    Decode { column: String, message: String },

    /// A resource could not be transformed into its 1.x shape
    #[error("Transform failed for {resource}: {message}")]
    Transform { resource: String, message: String },

    /// Encryption key has the wrong length
    #[error("encryption key must be 32 bytes, got {0}")]
    KeySize(usize),

    /// Encryption or decryption failed
    #[error("Cipher error: {0}")]
    Cipher(String),

    /// Remote API (source control, CI server) error
    #[error("Remote error: {0}")]
    Remote(#[from] reqwest::Error),

    /// Remote API returned a non-success status
    #[error("Remote request to {url} failed with status {status}")]
    RemoteStatus { url: String, status: u16 },

    /// Object storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// A best-effort step finished with failed items
    #[error("{failed} of {total} repositories failed")]
    Incomplete { failed: usize, total: usize },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl ToString, context: impl Into<String>) -> Self {
        MigrateError::Pool {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a Decode error
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a Transform error
    pub fn transform(resource: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Transform {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Process exit code for this error.
    ///
    /// Configuration and precondition failures exit with 2, best-effort steps
    /// with failed items exit with 3, everything else with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_) | MigrateError::KeySize(_) => 2,
            MigrateError::Incomplete { .. } => 3,
            _ => 1,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(MigrateError::Config("x".into()).exit_code(), 2);
        assert_eq!(MigrateError::KeySize(16).exit_code(), 2);
        assert_eq!(
            MigrateError::Incomplete { failed: 1, total: 2 }.exit_code(),
            3
        );
        assert_eq!(MigrateError::transform("steps", "orphan").exit_code(), 1);
    }

    #[test]
    fn test_format_detailed_includes_message() {
        let err = MigrateError::transform("steps", "no parent stage");
        let text = err.format_detailed();
        assert!(text.starts_with("Error: Transform failed for steps"));
        assert!(text.contains("no parent stage"));
    }
}
