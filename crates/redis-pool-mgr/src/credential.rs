//! Cache backend credentials

use std::fmt;

use serde::{Deserialize, Serialize};

/// Accessors a cache credential must expose.
pub trait CacheCredential: Send + Sync {
   fn host(&self) -> &str;
   fn port(&self) -> &str;
   /// Password sent with `AUTH`; empty means no `AUTH` is issued
   fn auth(&self) -> &str;
}

/// Plain-data cache credential
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
   pub host: String,
   pub port: String,
   #[serde(default)]
   pub auth: String,
}

impl CacheCredential for CacheConfig {
   fn host(&self) -> &str {
      &self.host
   }

   fn port(&self) -> &str {
      &self.port
   }

   fn auth(&self) -> &str {
      &self.auth
   }
}

impl fmt::Debug for CacheConfig {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      let auth = if self.auth.is_empty() { "" } else { "***" };
      f.debug_struct("CacheConfig")
         .field("host", &self.host)
         .field("port", &self.port)
         .field("auth", &auth)
         .finish()
   }
}

/// `host:port` address the pool dials
pub fn address(credential: &dyn CacheCredential) -> String {
   format!("{}:{}", credential.host(), credential.port())
}
