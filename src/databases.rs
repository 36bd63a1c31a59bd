//! Service object owning the SQL and cache registries

use std::sync::Arc;

use redis_pool_mgr::{CachePool, CachePoolSettings, CacheCredential};
use sqlx_engine_mgr::{SqlCredential, SqlEngine, SqlPoolSettings};

use crate::backends::{CacheBackend, SqlBackend};
use crate::error::Result;
use crate::logger::Logger;
use crate::registry::Registry;
use crate::retry::RetryPolicy;

/// Named SQL engines and cache pools, built on first request.
///
/// Construct once at startup and share by reference (or inside an `Arc`).
/// Independent instances never share handles, which keeps tests isolated.
///
/// Handles are owned by the registry; callers must not close them directly.
pub struct Databases {
   sql: Registry<SqlBackend>,
   cache: Registry<CacheBackend>,
}

impl Databases {
   /// Registries with default settings, default retry policy and a no-op logger
   pub fn new() -> Self {
      Builder::new().build()
   }

   pub fn builder() -> Builder {
      Builder::new()
   }

   /// Register the SQL credential for `name`, replacing any earlier one
   pub fn register_sql_credential(&self, name: impl Into<String>, credential: Arc<dyn SqlCredential>) {
      self.sql.register(name, credential);
   }

   /// Register the cache credential for `name`, replacing any earlier one
   pub fn register_cache_credential(
      &self,
      name: impl Into<String>,
      credential: Arc<dyn CacheCredential>,
   ) {
      self.cache.register(name, credential);
   }

   /// The engine for `name`, pinged if cached and rebuilt if dead
   pub async fn get_engine(&self, name: &str) -> Result<Arc<SqlEngine>> {
      self.sql.get(name).await
   }

   /// The cache pool for `name`, built on first request
   pub async fn get_pool(&self, name: &str) -> Result<Arc<CachePool>> {
      self.cache.get(name).await
   }

   pub fn sql(&self) -> &Registry<SqlBackend> {
      &self.sql
   }

   pub fn cache(&self) -> &Registry<CacheBackend> {
      &self.cache
   }

   /// Close every engine and pool, e.g. at shutdown
   pub async fn close_all(&self) {
      self.sql.close_all().await;
      self.cache.close_all().await;
   }
}

impl Default for Databases {
   fn default() -> Self {
      Self::new()
   }
}

/// Builder for [`Databases`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use pool_registry::{Databases, Logger, RetryPolicy, SqlConfig, SqlPoolSettings};
///
/// let databases = Databases::builder()
///     .logger(Logger::tracing())
///     .retry(RetryPolicy { max_attempts: 3, ..Default::default() })
///     .sql_settings(SqlPoolSettings { max_open_connections: 20, ..Default::default() })
///     .build();
///
/// databases.register_sql_credential(
///     "primary",
///     Arc::new(SqlConfig {
///         host: "127.0.0.1".into(),
///         port: "5432".into(),
///         user: "app".into(),
///         password: "secret".into(),
///         database: "orders".into(),
///         dialect: "postgres".into(),
///     }),
/// );
/// ```
#[derive(Debug, Default)]
pub struct Builder {
   logger: Logger,
   retry: RetryPolicy,
   sql_settings: SqlPoolSettings,
   cache_settings: CachePoolSettings,
}

impl Builder {
   pub fn new() -> Self {
      Self::default()
   }

   /// Sink for retry failures, ping failures and SQL statement echo;
   /// defaults to discarding
   pub fn logger(mut self, logger: Logger) -> Self {
      self.logger = logger;
      self
   }

   pub fn retry(mut self, retry: RetryPolicy) -> Self {
      self.retry = retry;
      self
   }

   pub fn sql_settings(mut self, settings: SqlPoolSettings) -> Self {
      self.sql_settings = settings;
      self
   }

   pub fn cache_settings(mut self, settings: CachePoolSettings) -> Self {
      self.cache_settings = settings;
      self
   }

   pub fn build(self) -> Databases {
      Databases {
         sql: Registry::new(
            SqlBackend::new(self.sql_settings).with_statement_echo(&self.logger),
            self.retry.clone(),
            self.logger.clone(),
         ),
         cache: Registry::new(CacheBackend::new(self.cache_settings), self.retry, self.logger),
      }
   }
}
