//! # sqlx-engine-mgr
//!
//! Turns a named SQL credential into a ready-to-use sqlx connection pool.
//!
//! ## Core Types
//!
//! - **[`SqlEngine`]**: pooled engine for MySQL or PostgreSQL
//! - **[`SqlCredential`]** / **[`SqlConfig`]**: accessor trait and plain-data credential
//! - **[`Dialect`]**: the two supported backends, parsed from `"mysql"` / `"postgres"`
//! - **[`SqlPoolSettings`]**: pool sizing, timeouts and statement echo
//! - **[`Error`]**: error type for engine construction and probing
//!
//! ## Behaviour
//!
//! - **DSN per dialect**: credentials are rendered into each driver's URL grammar,
//!   see [`dsn`]
//! - **Statement echo**: statements and their execution time are logged through
//!   `tracing` when [`SqlPoolSettings::echo_statements`] is set
//! - **Eager first connection**: [`SqlEngine::connect`] only returns once the
//!   backend accepted a connection, so bad addresses and credentials fail early

mod config;
mod credential;
pub mod dsn;
mod engine;
mod error;

pub use sqlx;

// Re-export public types
pub use config::SqlPoolSettings;
pub use credential::{Dialect, MYSQL, POSTGRES, SqlConfig, SqlCredential};
pub use engine::SqlEngine;
pub use error::{Error, Result};
