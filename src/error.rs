/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for resolving named engines and pools.
///
/// Retry exhaustion returns the last underlying error as-is, without an
/// attempt count attached.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// No credential is registered under the requested name.
   #[error("no such database config: {0}")]
   ConfigMissing(String),

   /// The SQL credential names a dialect outside the supported pair.
   #[error("unsupported driver '{0}': only mysql and postgres are supported")]
   UnsupportedDialect(String),

   /// Failure building or probing a SQL engine.
   #[error(transparent)]
   Sql(sqlx_engine_mgr::Error),

   /// Failure building or probing a cache pool.
   #[error(transparent)]
   Cache(#[from] redis_pool_mgr::Error),

   /// Generic error for backends plugged in from outside this crate.
   #[error("{0}")]
   Other(String),
}

impl Error {
   /// Errors that no amount of retrying will fix.
   pub fn is_terminal(&self) -> bool {
      matches!(self, Error::ConfigMissing(_) | Error::UnsupportedDialect(_))
   }

   /// Extract a structured error code from the error type.
   ///
   /// This provides machine-readable error codes for error handling.
   pub fn error_code(&self) -> String {
      match self {
         Error::ConfigMissing(_) => "CONFIG_MISSING".to_string(),
         Error::UnsupportedDialect(_) => "UNSUPPORTED_DIALECT".to_string(),
         Error::Sql(sqlx_engine_mgr::Error::Sqlx(e)) => {
            if let Some(code) = e.as_database_error().and_then(|db_err| db_err.code()) {
               return format!("SQL_{}", code);
            }
            "SQL_CONNECT_FAILURE".to_string()
         }
         Error::Sql(_) => "SQL_ERROR".to_string(),
         Error::Cache(_) => "CACHE_CONNECT_FAILURE".to_string(),
         Error::Other(_) => "ERROR".to_string(),
      }
   }
}

impl From<sqlx_engine_mgr::Error> for Error {
   fn from(err: sqlx_engine_mgr::Error) -> Self {
      match err {
         sqlx_engine_mgr::Error::UnsupportedDialect(dialect) => Error::UnsupportedDialect(dialect),
         other => Error::Sql(other),
      }
   }
}
