//! Sizing and health-check policy for cache pools

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Pool settings applied to every cache pool built by this crate
///
/// # Examples
///
/// ```
/// use redis_pool_mgr::CachePoolSettings;
///
/// // Fail fast instead of queueing when the pool is exhausted
/// let settings = CachePoolSettings {
///     wait: false,
///     ..Default::default()
/// };
/// # assert_eq!(settings.max_active, 4000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachePoolSettings {
   /// Maximum idle connections kept after each reaper sweep
   ///
   /// Default: 500
   pub max_idle: usize,

   /// Maximum connections, idle or checked out
   ///
   /// Default: 4000
   pub max_active: usize,

   /// Idle connections unused for longer than this are dropped
   ///
   /// Default: 30 seconds
   pub idle_timeout: Duration,

   /// Block until a connection frees up when the pool is exhausted.
   ///
   /// When false, checkout fails immediately instead.
   ///
   /// Default: true
   pub wait: bool,

   /// Connections used more recently than this are handed out without a `PING`
   ///
   /// Default: 1 minute
   pub test_on_borrow_after: Duration,

   /// Check out one connection while building the pool
   ///
   /// Default: true
   pub verify_on_build: bool,
}

impl Default for CachePoolSettings {
   fn default() -> Self {
      Self {
         max_idle: 500,
         max_active: 4000,
         idle_timeout: Duration::from_secs(30),
         wait: true,
         test_on_borrow_after: Duration::from_secs(60),
         verify_on_build: true,
      }
   }
}
