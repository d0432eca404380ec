//! Record types of both schemas.
//!
//! - [`legacy`]: 0.x rows, decoded with [`FromRow`](crate::core::FromRow)
//! - [`current`]: 1.x rows, encoded with [`Record`](crate::core::Record)

pub mod current;
pub mod legacy;

pub use current::{BuildV1, LogV1, RepoV1, SecretV1, StageV1, StepV1, UserV1};
pub use legacy::{BuildV0, ProcessV0, RegistryV0, RepoV0, SecretV0, UserV0};
