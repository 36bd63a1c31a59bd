//! deadpool manager that dials, authenticates and health-checks connections

use std::time::Duration;

use deadpool::managed::{self, Metrics, RecycleError, RecycleResult};
use redis::aio::MultiplexedConnection;
use redis::{Client, RedisError};
use tracing::{debug, trace};

/// Creates authenticated Redis connections and vets them on checkout.
#[derive(Debug)]
pub struct RedisManager {
   client: Client,
   password: String,
   test_on_borrow_after: Duration,
}

impl RedisManager {
   /// Manager for the server at `address` (`host:port`).
   ///
   /// An empty `password` skips `AUTH` entirely.
   pub fn new(
      address: &str,
      password: impl Into<String>,
      test_on_borrow_after: Duration,
   ) -> Result<Self, RedisError> {
      let client = Client::open(format!("redis://{address}"))?;
      Ok(Self {
         client,
         password: password.into(),
         test_on_borrow_after,
      })
   }

   /// Whether a connection last used `idle` ago must be pinged before reuse
   pub fn needs_check(&self, idle: Duration) -> bool {
      idle >= self.test_on_borrow_after
   }
}

impl managed::Manager for RedisManager {
   type Type = MultiplexedConnection;
   type Error = RedisError;

   async fn create(&self) -> Result<MultiplexedConnection, RedisError> {
      let mut conn = self.client.get_multiplexed_async_connection().await?;

      if !self.password.is_empty() {
         let _: () = redis::cmd("AUTH")
            .arg(&self.password)
            .query_async(&mut conn)
            .await?;
      }

      debug!(authenticated = !self.password.is_empty(), "Redis connection established");
      Ok(conn)
   }

   async fn recycle(
      &self,
      conn: &mut MultiplexedConnection,
      metrics: &Metrics,
   ) -> RecycleResult<RedisError> {
      if !self.needs_check(metrics.last_used()) {
         return Ok(());
      }

      let _: String = redis::cmd("PING")
         .query_async(conn)
         .await
         .map_err(RecycleError::Backend)?;

      trace!("Stale Redis connection passed PING");
      Ok(())
   }
}
