//! Error types for sqlx-engine-mgr

use thiserror::Error;

/// Errors that may occur while building or pinging a SQL engine
#[derive(Error, Debug)]
pub enum Error {
   /// Error from the sqlx library. Covers DSN parse failures, network and
   /// authentication errors reported by the driver.
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),

   /// The credential names a dialect other than `mysql` or `postgres`
   #[error("unsupported driver '{0}': only mysql and postgres are supported")]
   UnsupportedDialect(String),
}

impl Error {
   /// Whether retrying the same build could succeed.
   ///
   /// A bad dialect identifier never fixes itself; everything reported by
   /// the driver is treated as transient.
   pub fn is_terminal(&self) -> bool {
      matches!(self, Error::UnsupportedDialect(_))
   }
}

/// A type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
