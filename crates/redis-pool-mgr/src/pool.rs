//! Cache pool handle with idle reaping

use std::cell::Cell;
use std::fmt;
use std::time::Duration;

use deadpool::Runtime;
use deadpool::managed::{BuildError, Manager, Object, Pool, Status};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::config::CachePoolSettings;
use crate::credential::{CacheCredential, address};
use crate::error::Result;
use crate::manager::RedisManager;

/// A pooled connection; returns to the pool on drop
pub type CacheConnection = Object<RedisManager>;

/// Connection pool for one cache credential.
///
/// ## Lifecycle
///
/// ```text
/// 1. new(): pool assembled, optionally one connection verified
/// 2. get(): connections created lazily, vetted on checkout when stale
/// 3. reaper: idle connections trimmed every `idle_timeout`
/// 4. close(): pool closed, reaper stopped
/// ```
pub struct CachePool {
   pool: Pool<RedisManager>,
   reaper: Option<JoinHandle<()>>,
   address: String,
}

impl CachePool {
   /// Build a pool for `credential`.
   ///
   /// With [`CachePoolSettings::verify_on_build`] set, one connection is
   /// checked out so that unreachable servers and rejected passwords fail
   /// here rather than on first use.
   pub async fn new(credential: &dyn CacheCredential, settings: &CachePoolSettings) -> Result<Self> {
      let address = address(credential);
      let manager = RedisManager::new(&address, credential.auth(), settings.test_on_borrow_after)?;

      let pool = build_pool(manager, settings)?;

      if settings.verify_on_build {
         let conn = pool.get().await?;
         drop(conn);
      }

      let reaper = tokio::runtime::Handle::try_current()
         .ok()
         .filter(|_| !settings.idle_timeout.is_zero())
         .map(|handle| {
            handle.spawn(reap_idle(
               pool.clone(),
               settings.max_idle,
               settings.idle_timeout,
               settings.idle_timeout,
            ))
         });

      debug!(address = %address, max_active = settings.max_active, "Cache pool ready");

      Ok(Self {
         pool,
         reaper,
         address,
      })
   }

   /// Check a connection out, blocking or failing on exhaustion per `wait`
   pub async fn get(&self) -> Result<CacheConnection> {
      Ok(self.pool.get().await?)
   }

   /// Issue a `PING` on a pooled connection
   pub async fn ping(&self) -> Result<()> {
      let mut conn = self.get().await?;
      let _: String = redis::cmd("PING").query_async(&mut *conn).await?;
      Ok(())
   }

   /// Close the pool and stop the reaper. Checked-out connections are dropped
   /// when their holders release them.
   pub fn close(&self) {
      if let Some(reaper) = &self.reaper {
         reaper.abort();
      }
      self.pool.close();
      debug!(address = %self.address, "Cache pool closed");
   }

   pub fn is_closed(&self) -> bool {
      self.pool.is_closed()
   }

   pub fn status(&self) -> Status {
      self.pool.status()
   }

   /// `host:port` this pool dials
   pub fn address(&self) -> &str {
      &self.address
   }
}

impl fmt::Debug for CachePool {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("CachePool")
         .field("address", &self.address)
         .field("status", &self.pool.status())
         .field("closed", &self.pool.is_closed())
         .finish()
   }
}

impl Drop for CachePool {
   fn drop(&mut self) {
      if let Some(reaper) = self.reaper.take() {
         reaper.abort();
      }
   }
}

/// Size and exhaustion policy shared by every cache pool
fn build_pool<M: Manager>(manager: M, settings: &CachePoolSettings) -> std::result::Result<Pool<M>, BuildError> {
   // Zero wait makes deadpool fail immediately on an exhausted pool
   let wait_timeout = if settings.wait { None } else { Some(Duration::ZERO) };

   Pool::builder(manager)
      .max_size(settings.max_active)
      .wait_timeout(wait_timeout)
      .runtime(Runtime::Tokio1)
      .build()
}

/// Drop idle connections unused for `idle_timeout` or more and keep at most
/// `max_idle` of the rest. Returns how many were kept.
fn sweep_idle<M: Manager>(pool: &Pool<M>, max_idle: usize, idle_timeout: Duration) -> usize {
   let kept = Cell::new(0usize);
   pool.retain(|_, metrics| {
      let keep = metrics.last_used() < idle_timeout && kept.get() < max_idle;
      if keep {
         kept.set(kept.get() + 1);
      }
      keep
   });
   kept.get()
}

async fn reap_idle<M: Manager + 'static>(
   pool: Pool<M>,
   max_idle: usize,
   idle_timeout: Duration,
   every: Duration,
) {
   let mut interval = tokio::time::interval(every);
   // The first tick completes immediately
   interval.tick().await;

   loop {
      interval.tick().await;
      if pool.is_closed() {
         break;
      }

      let kept = sweep_idle(&pool, max_idle, idle_timeout);
      trace!(kept, "Reaped idle cache connections");
   }
}

#[cfg(test)]
mod tests {
   use std::convert::Infallible;

   use deadpool::managed::{Metrics, PoolError, RecycleResult};

   use super::*;
   use crate::credential::CacheConfig;
   use crate::error::Error;

   /// Connections that need no server
   struct Plain;

   impl Manager for Plain {
      type Type = ();
      type Error = Infallible;

      async fn create(&self) -> std::result::Result<(), Infallible> {
         Ok(())
      }

      async fn recycle(&self, _: &mut (), _: &Metrics) -> RecycleResult<Infallible> {
         Ok(())
      }
   }

   fn plain_pool(settings: &CachePoolSettings) -> Pool<Plain> {
      build_pool(Plain, settings).unwrap()
   }

   /// Check out `n` connections at once, then return them all as idle
   async fn fill(pool: &Pool<Plain>, n: usize) {
      let mut held = Vec::new();
      for _ in 0..n {
         held.push(pool.get().await.unwrap());
      }
      drop(held);
   }

   fn unreachable() -> CacheConfig {
      CacheConfig {
         host: "127.0.0.1".into(),
         // Nothing listens on port 1
         port: "1".into(),
         auth: String::new(),
      }
   }

   #[tokio::test]
   async fn lazy_pool_builds_without_server() {
      let settings = CachePoolSettings {
         verify_on_build: false,
         ..Default::default()
      };

      let pool = CachePool::new(&unreachable(), &settings).await.unwrap();
      assert_eq!(pool.address(), "127.0.0.1:1");
      assert_eq!(pool.status().max_size, 4000);
      assert_eq!(pool.status().size, 0);
   }

   #[tokio::test]
   async fn verified_pool_reports_unreachable_server() {
      let err = CachePool::new(&unreachable(), &CachePoolSettings::default())
         .await
         .unwrap_err();

      assert!(matches!(err, Error::Pool(_)));
   }

   #[tokio::test]
   async fn closed_pool_refuses_checkout() {
      let settings = CachePoolSettings {
         verify_on_build: false,
         ..Default::default()
      };

      let pool = CachePool::new(&unreachable(), &settings).await.unwrap();
      pool.close();

      assert!(pool.is_closed());
      assert!(pool.get().await.is_err());
   }

   #[tokio::test]
   async fn exhausted_pool_fails_fast_without_wait() {
      let pool = plain_pool(&CachePoolSettings {
         max_active: 1,
         wait: false,
         ..Default::default()
      });

      let _held = pool.get().await.unwrap();
      let second = tokio::time::timeout(Duration::from_secs(1), pool.get())
         .await
         .expect("checkout should not wait");

      assert!(matches!(second, Err(PoolError::Timeout(_))));
   }

   #[tokio::test]
   async fn exhausted_pool_blocks_with_wait() {
      let pool = plain_pool(&CachePoolSettings {
         max_active: 1,
         wait: true,
         ..Default::default()
      });

      let held = pool.get().await.unwrap();
      let blocked = tokio::time::timeout(Duration::from_millis(50), pool.get()).await;
      assert!(blocked.is_err(), "checkout should wait for a free connection");

      drop(held);
      assert!(pool.get().await.is_ok());
   }

   #[tokio::test]
   async fn sweep_keeps_at_most_max_idle() {
      let pool = plain_pool(&CachePoolSettings::default());
      fill(&pool, 3).await;
      assert_eq!(pool.status().size, 3);

      let kept = sweep_idle(&pool, 1, Duration::from_secs(30));

      assert_eq!(kept, 1);
      assert_eq!(pool.status().size, 1);
   }

   #[tokio::test]
   async fn sweep_drops_connections_idle_too_long() {
      let pool = plain_pool(&CachePoolSettings::default());
      fill(&pool, 2).await;

      tokio::time::sleep(Duration::from_millis(60)).await;
      let kept = sweep_idle(&pool, 500, Duration::from_millis(50));

      assert_eq!(kept, 0);
      assert_eq!(pool.status().size, 0);
   }

   #[tokio::test]
   async fn reaper_task_trims_idle_connections() {
      let pool = plain_pool(&CachePoolSettings::default());
      fill(&pool, 4).await;

      let reaper = tokio::spawn(reap_idle(
         pool.clone(),
         500,
         Duration::from_millis(50),
         Duration::from_millis(20),
      ));
      tokio::time::sleep(Duration::from_millis(300)).await;

      assert_eq!(pool.status().size, 0);

      pool.close();
      tokio::time::timeout(Duration::from_secs(1), reaper)
         .await
         .expect("reaper stops once the pool is closed")
         .unwrap();
   }
}
