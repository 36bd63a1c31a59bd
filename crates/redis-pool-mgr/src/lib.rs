//! # redis-pool-mgr
//!
//! Redis connection pools with the checkout policy a shared cache needs:
//! authenticate on dial, ping connections that sat unused for a while, trim
//! idle connections in the background.
//!
//! ## Core Types
//!
//! - **[`CachePool`]**: pool handle for one credential
//! - **[`CacheCredential`]** / **[`CacheConfig`]**: accessor trait and plain-data credential
//! - **[`CachePoolSettings`]**: sizing, exhaustion and health-check policy
//! - **[`RedisManager`]**: the deadpool manager doing dial, `AUTH` and `PING`
//! - **[`Error`]**: error type for pool construction and checkout

mod config;
mod credential;
mod error;
mod manager;
mod pool;

// Re-export public types
pub use config::CachePoolSettings;
pub use credential::{CacheConfig, CacheCredential, address};
pub use error::{Error, Result};
pub use manager::RedisManager;
pub use pool::{CacheConnection, CachePool};
