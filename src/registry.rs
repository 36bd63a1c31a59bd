//! Lazily built, self-healing map from logical names to pool handles

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::ConfigStore;
use crate::error::{Error, Result};
use crate::logger::Logger;
use crate::retry::{RetryPolicy, with_retry};

/// Builds, pings and closes handles for one kind of backend.
pub trait PoolFactory: Send + Sync + 'static {
   /// Credential accessor type, usually a trait object
   type Credential: ?Sized + Send + Sync + 'static;

   /// The pooled engine or connection pool handed to callers
   type Handle: Send + Sync + 'static;

   /// Short label used in log output
   const KIND: &'static str;

   /// Ping cached handles before handing them out again
   const PING_ON_REUSE: bool;

   fn build(&self, credential: &Self::Credential) -> impl Future<Output = Result<Self::Handle>> + Send;

   fn ping(&self, handle: &Self::Handle) -> impl Future<Output = Result<()>> + Send;

   fn close(&self, handle: &Self::Handle) -> impl Future<Output = ()> + Send;
}

/// Per-name state. `entry` is `None` when absent: never built, failed to
/// build, or closed.
///
/// `cached` mirrors `entry.is_some()` and can be read without waiting for
/// the lock, which `get` holds across pings and builds.
struct Slot<H> {
   entry: tokio::sync::Mutex<Option<Arc<H>>>,
   cached: AtomicBool,
}

impl<H> Default for Slot<H> {
   fn default() -> Self {
      Self {
         entry: tokio::sync::Mutex::new(None),
         cached: AtomicBool::new(false),
      }
   }
}

impl<H> Slot<H> {
   fn store(&self, entry: &mut Option<Arc<H>>, handle: Option<Arc<H>>) {
      self.cached.store(handle.is_some(), Ordering::Release);
      *entry = handle;
   }

   async fn take(&self) -> Option<Arc<H>> {
      let mut entry = self.entry.lock().await;
      self.cached.store(false, Ordering::Release);
      entry.take()
   }

   fn is_cached(&self) -> bool {
      self.cached.load(Ordering::Acquire)
   }
}

/// Credentials plus live handles for one backend kind.
///
/// ## Resolution
///
/// ```text
/// absent ──build (with retry)──▶ live ──ping ok──▶ live (same handle)
///                                  │
///                                  └─ping fails──▶ close, rebuild ──▶ live (new handle)
/// ```
///
/// Each name has its own lock, held across lookup, build and replace. At
/// most one build is in flight per name and a slow backend never blocks
/// lookups of other names.
pub struct Registry<F: PoolFactory> {
   factory: F,
   configs: ConfigStore<F::Credential>,
   slots: Mutex<HashMap<String, Arc<Slot<F::Handle>>>>,
   retry: RetryPolicy,
   logger: Logger,
}

impl<F: PoolFactory> Registry<F> {
   pub fn new(factory: F, retry: RetryPolicy, logger: Logger) -> Self {
      Self {
         factory,
         configs: ConfigStore::new(),
         slots: Mutex::new(HashMap::new()),
         retry,
         logger,
      }
   }

   /// Store a credential under `name`, replacing any earlier one.
   ///
   /// A handle already built for `name` keeps running on the old credential
   /// until it fails a ping or is closed.
   pub fn register(&self, name: impl Into<String>, credential: Arc<F::Credential>) {
      let name = name.into();
      debug!(kind = F::KIND, db = %name, "Registering credential");
      self.configs.register(name, credential);
   }

   pub fn is_registered(&self, name: &str) -> bool {
      self.configs.contains(name)
   }

   /// Get the handle for `name`, building or rebuilding it as needed.
   ///
   /// Unregistered names fail with [`Error::ConfigMissing`] without any
   /// build attempt.
   pub async fn get(&self, name: &str) -> Result<Arc<F::Handle>> {
      let slot = self.slot(name);
      let mut entry = slot.entry.lock().await;

      if let Some(handle) = entry.clone() {
         if !F::PING_ON_REUSE {
            return Ok(handle);
         }

         match self.factory.ping(&handle).await {
            Ok(()) => return Ok(handle),
            Err(err) => {
               warn!(kind = F::KIND, db = %name, error = %err, "Cached handle failed liveness ping");
               self
                  .logger
                  .log(format_args!("{}: liveness ping failed: {}", name, err));
            }
         }

         slot.store(&mut entry, None);
         self.factory.close(&handle).await;
      }

      let handle = Arc::new(self.build(name).await?);
      slot.store(&mut entry, Some(Arc::clone(&handle)));
      debug!(kind = F::KIND, db = %name, "Handle cached");
      Ok(handle)
   }

   /// Close and forget the handle for `name`. The credential stays
   /// registered, so the next `get` builds afresh.
   ///
   /// Returns whether a handle was open.
   pub async fn close(&self, name: &str) -> bool {
      let slot = self.slots.lock().get(name).cloned();
      let Some(slot) = slot else {
         return false;
      };

      let stale = slot.take().await;
      match stale {
         Some(handle) => {
            self.factory.close(&handle).await;
            debug!(kind = F::KIND, db = %name, "Handle closed");
            true
         }
         None => false,
      }
   }

   /// Close every cached handle
   pub async fn close_all(&self) {
      let slots: Vec<(String, Arc<Slot<F::Handle>>)> = self
         .slots
         .lock()
         .iter()
         .map(|(name, slot)| (name.clone(), Arc::clone(slot)))
         .collect();

      for (name, slot) in slots {
         if let Some(handle) = slot.take().await {
            self.factory.close(&handle).await;
            debug!(kind = F::KIND, db = %name, "Handle closed");
         }
      }
   }

   /// Names that currently hold a handle, including ones being pinged.
   ///
   /// Never waits: a name whose first build is still in flight is not listed
   /// yet, and a name whose ping just failed drops out until it is rebuilt.
   pub fn cached_names(&self) -> Vec<String> {
      self
         .slots
         .lock()
         .iter()
         .filter(|(_, slot)| slot.is_cached())
         .map(|(name, _)| name.clone())
         .collect()
   }

   pub fn factory(&self) -> &F {
      &self.factory
   }

   /// The per-name lock, created on first access
   fn slot(&self, name: &str) -> Arc<Slot<F::Handle>> {
      let mut slots = self.slots.lock();
      Arc::clone(slots.entry(name.to_string()).or_default())
   }

   async fn build(&self, name: &str) -> Result<F::Handle> {
      let credential = self
         .configs
         .get(name)
         .ok_or_else(|| Error::ConfigMissing(name.to_string()))?;

      debug!(kind = F::KIND, db = %name, "Building handle");
      with_retry(&self.retry, &self.logger, name, |_| self.factory.build(&credential)).await
   }
}
