//! Error types for redis-pool-mgr

use deadpool::managed::{BuildError, PoolError};
use redis::RedisError;
use thiserror::Error;

/// Errors that may occur when building or using a cache pool
#[derive(Error, Debug)]
pub enum Error {
   /// Dial, AUTH or PING failure reported by the Redis client
   #[error("Redis error: {0}")]
   Redis(#[from] RedisError),

   /// The pool could not be assembled from its settings
   #[error("Pool build error: {0}")]
   Build(#[from] BuildError),

   /// Checking a connection out of the pool failed
   #[error("Pool error: {0}")]
   Pool(#[from] PoolError<RedisError>),
}

/// A type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
