//! Core abstractions shared by every migration step.
//!
//! - [`value`]: backend-neutral values, rows and statements
//! - [`traits`]: the [`Dialect`] capability and the [`Store`] / [`Transaction`]
//!   relational capability implemented by each driver
//!
//! Steps are written against these traits only, which keeps the transformation
//! logic testable against an in-memory SQLite store.

pub mod traits;
pub mod value;

pub use traits::{Dialect, FromRow, Record, Store, Transaction};
pub use value::{Row, SqlValue, Statement};
