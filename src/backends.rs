//! Pool factories for the SQL and cache backends

use std::sync::Arc;

use redis_pool_mgr::{CachePool, CachePoolSettings, CacheCredential};
use sqlx_engine_mgr::{SqlCredential, SqlEngine, SqlPoolSettings};

use crate::echo::EchoRegistration;
use crate::error::Result;
use crate::logger::Logger;
use crate::registry::PoolFactory;

/// Builds [`SqlEngine`]s; cached engines are pinged before reuse.
#[derive(Debug, Clone, Default)]
pub struct SqlBackend {
   settings: SqlPoolSettings,
   echo: Option<Arc<EchoRegistration>>,
}

impl SqlBackend {
   pub fn new(settings: SqlPoolSettings) -> Self {
      Self {
         settings,
         echo: None,
      }
   }

   /// Send statement echo of engines to `logger` as `sql: ...` lines.
   ///
   /// Does nothing when echo is disabled in the settings or the logger is a
   /// no-op. The subscription ends when the last clone of this backend drops.
   pub fn with_statement_echo(mut self, logger: &Logger) -> Self {
      if self.settings.echo_statements && !logger.is_noop() {
         self.echo = Some(Arc::new(EchoRegistration::register(logger.clone())));
      }
      self
   }

   pub fn echoes_statements(&self) -> bool {
      self.echo.is_some()
   }

   pub fn settings(&self) -> &SqlPoolSettings {
      &self.settings
   }
}

impl PoolFactory for SqlBackend {
   type Credential = dyn SqlCredential;
   type Handle = SqlEngine;

   const KIND: &'static str = "sql";
   const PING_ON_REUSE: bool = true;

   async fn build(&self, credential: &Self::Credential) -> Result<SqlEngine> {
      Ok(SqlEngine::connect(credential, &self.settings).await?)
   }

   async fn ping(&self, engine: &SqlEngine) -> Result<()> {
      Ok(engine.ping().await?)
   }

   async fn close(&self, engine: &SqlEngine) {
      engine.close().await;
   }
}

/// Builds [`CachePool`]s.
///
/// Cached pools are handed out without a ping; the pool's own checkout
/// `PING` of stale connections is the runtime liveness check.
#[derive(Debug, Clone, Default)]
pub struct CacheBackend {
   settings: CachePoolSettings,
}

impl CacheBackend {
   pub fn new(settings: CachePoolSettings) -> Self {
      Self { settings }
   }

   pub fn settings(&self) -> &CachePoolSettings {
      &self.settings
   }
}

impl PoolFactory for CacheBackend {
   type Credential = dyn CacheCredential;
   type Handle = CachePool;

   const KIND: &'static str = "cache";
   const PING_ON_REUSE: bool = false;

   async fn build(&self, credential: &Self::Credential) -> Result<CachePool> {
      Ok(CachePool::new(credential, &self.settings).await?)
   }

   async fn ping(&self, pool: &CachePool) -> Result<()> {
      Ok(pool.ping().await?)
   }

   async fn close(&self, pool: &CachePool) {
      pool.close();
   }
}
