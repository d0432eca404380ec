//! # drone-migrate
//!
//! Moves a Drone 0.x database to the Drone 1.x schema.
//!
//! The migration is a sequence of independent steps run by an operator:
//!
//! 1. [`schema::setup`] creates the 1.x tables, tracked in a ledger
//! 2. [`migrate`] copies users, repositories, builds, stages and steps, logs,
//!    secrets and registry credentials, one resource kind per call
//! 3. [`reconcile`] resolves repository ids against the source control
//!    provider and activates repositories on the Drone server
//! 4. [`migrate::encrypt_secrets`] optionally encrypts secrets at rest
//!
//! SQLite, PostgreSQL and MySQL are supported on both sides.
//!
//! ## Example
//!
//! ```rust,no_run
//! use drone_migrate::{drivers, migrate, schema, Config};
//!
//! #[tokio::main]
//! async fn main() -> drone_migrate::Result<()> {
//!     let config = Config::load("migrate.yaml")?;
//!     let source = drivers::connect(config.require_source()?, true).await?;
//!     let target = drivers::connect(config.require_target()?, false).await?;
//!
//!     schema::setup(target.as_ref()).await?;
//!     let summary = migrate::migrate_users(source.as_ref(), target.as_ref()).await?;
//!     println!("Migrated {} users", summary.loaded);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod crypto;
pub mod drivers;
pub mod error;
pub mod migrate;
pub mod model;
pub mod reconcile;
pub mod remote;
pub mod schema;
pub mod storage;
pub mod transfer;
pub mod transform;

// Re-exports for convenient access
pub use config::{Config, DatabaseConfig, DroneConfig, Overrides, S3Config, ScmConfig};
pub use crate::core::{Dialect, Record, Row, SqlValue, Statement, Store, Transaction};
pub use crypto::SecretCipher;
pub use drivers::{connect, DialectImpl, Driver};
pub use error::{MigrateError, Result};
pub use migrate::StepSummary;
pub use reconcile::{ItemError, RepoOutcome, ResolutionReport};
pub use remote::{CiServer, RemoteRepo, ScmClient};
pub use storage::{BlobStore, S3BlobStore};
