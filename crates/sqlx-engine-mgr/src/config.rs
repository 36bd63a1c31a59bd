//! Sizing and logging policy for SQL engine pools

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Pool settings applied to every engine built by this crate
///
/// # Examples
///
/// ```
/// use sqlx_engine_mgr::SqlPoolSettings;
/// use std::time::Duration;
///
/// // Use defaults
/// let settings = SqlPoolSettings::default();
///
/// // Override just one field
/// let settings = SqlPoolSettings {
///     max_open_connections: 20,
///     ..Default::default()
/// };
/// # assert_eq!(settings.idle_timeout, Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlPoolSettings {
   /// Upper bound on connections kept open while idle.
   ///
   /// sqlx retires idle connections after `idle_timeout` but never below
   /// `min_connections`; this value caps that floor.
   ///
   /// Default: 50
   pub max_idle_connections: u32,

   /// Maximum number of open connections per engine
   ///
   /// Default: 200
   pub max_open_connections: u32,

   /// Connections the pool keeps warm, capped by `max_idle_connections`
   ///
   /// Default: 0
   pub min_connections: u32,

   /// Idle connections older than this are closed
   ///
   /// Default: 30 seconds
   pub idle_timeout: Duration,

   /// How long a caller waits for a free connection before giving up.
   ///
   /// Also bounds how long the initial connect keeps retrying a refused
   /// connection inside sqlx.
   ///
   /// Default: 30 seconds
   pub acquire_timeout: Duration,

   /// Echo every statement, with its execution time, through `tracing`
   ///
   /// Default: true
   pub echo_statements: bool,

   /// Statements slower than this are additionally logged at WARN
   ///
   /// Default: 1 second
   pub slow_statement_threshold: Duration,
}

impl SqlPoolSettings {
   /// `min_connections` after applying the idle cap and the open cap
   pub fn effective_min_connections(&self) -> u32 {
      self
         .min_connections
         .min(self.max_idle_connections)
         .min(self.max_open_connections)
   }
}

impl Default for SqlPoolSettings {
   fn default() -> Self {
      Self {
         max_idle_connections: 50,
         max_open_connections: 200,
         min_connections: 0,
         idle_timeout: Duration::from_secs(30),
         acquire_timeout: Duration::from_secs(30),
         echo_statements: true,
         slow_statement_threshold: Duration::from_secs(1),
      }
   }
}
