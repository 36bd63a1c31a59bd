//! # pool-registry
//!
//! Register backend credentials under a logical name, then ask for a ready
//! pooled SQL engine or Redis pool by that name. Handles are built on first
//! request with bounded retry, cached, and rebuilt when a SQL engine stops
//! answering pings.
//!
//! ## Core Types
//!
//! - **[`Databases`]**: service object with the registration and resolution API
//! - **[`Registry`]**: generic per-name get-or-create-or-heal map over a [`PoolFactory`]
//! - **[`RetryPolicy`]**: attempt bound and flat delay for builds
//! - **[`Logger`]**: caller-supplied formatted-text sink, no-op by default; also
//!   receives SQL statement echo through [`StatementEchoLayer`]
//! - **[`Error`]**: error type for resolution
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pool_registry::{CacheConfig, Databases, SqlConfig};
//!
//! # async fn run() -> pool_registry::Result<()> {
//! let databases = Databases::new();
//! databases.register_sql_credential(
//!    "primary",
//!    Arc::new(SqlConfig {
//!       host: "127.0.0.1".into(),
//!       port: "3306".into(),
//!       user: "app".into(),
//!       password: "secret".into(),
//!       database: "orders".into(),
//!       dialect: "mysql".into(),
//!    }),
//! );
//! databases.register_cache_credential(
//!    "cache1",
//!    Arc::new(CacheConfig {
//!       host: "127.0.0.1".into(),
//!       port: "6379".into(),
//!       auth: String::new(),
//!    }),
//! );
//!
//! let engine = databases.get_engine("primary").await?;
//! let pool = databases.get_pool("cache1").await?;
//! # let _ = (engine, pool);
//! # Ok(())
//! # }
//! ```

mod backends;
mod config;
mod databases;
mod echo;
mod error;
mod logger;
mod registry;
mod retry;

pub use backends::{CacheBackend, SqlBackend};
pub use config::ConfigStore;
pub use databases::{Builder, Databases};
pub use echo::{STATEMENT_TARGET, StatementEchoLayer, install_global, statement_echo_layer};
pub use error::{Error, Result};
pub use logger::{LogWriter, Logger};
pub use registry::{PoolFactory, Registry};
pub use retry::{RetryPolicy, with_retry};

pub use redis_pool_mgr::{CacheConfig, CacheCredential, CachePool, CachePoolSettings};
pub use sqlx_engine_mgr::{Dialect, MYSQL, POSTGRES, SqlConfig, SqlCredential, SqlEngine, SqlPoolSettings};
