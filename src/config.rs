//! Named credential storage

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// Maps logical names to credentials.
///
/// Registration overwrites silently and entries are never removed. Contents
/// are not validated; a bad host or port shows up as a connection failure
/// when the name is first resolved.
pub struct ConfigStore<C: ?Sized> {
   entries: RwLock<HashMap<String, Arc<C>>>,
}

impl<C: ?Sized> ConfigStore<C> {
   pub fn new() -> Self {
      Self {
         entries: RwLock::new(HashMap::new()),
      }
   }

   /// Store `credential` under `name`, replacing any earlier one
   pub fn register(&self, name: impl Into<String>, credential: Arc<C>) {
      self.entries.write().insert(name.into(), credential);
   }

   pub fn get(&self, name: &str) -> Option<Arc<C>> {
      self.entries.read().get(name).cloned()
   }

   pub fn contains(&self, name: &str) -> bool {
      self.entries.read().contains_key(name)
   }

   pub fn names(&self) -> Vec<String> {
      self.entries.read().keys().cloned().collect()
   }
}

impl<C: ?Sized> Default for ConfigStore<C> {
   fn default() -> Self {
      Self::new()
   }
}
