//! Pooled SQL engine for one credential

use std::str::FromStr;

use log::LevelFilter;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::{ConnectOptions, Connection};
use tracing::{debug, trace};

use crate::config::SqlPoolSettings;
use crate::credential::{Dialect, SqlCredential};
use crate::dsn;
use crate::error::Result;

/// A configured connection pool for one of the supported dialects.
///
/// Cloning is cheap and yields another handle to the same pool; closing any
/// clone closes them all.
#[derive(Debug, Clone)]
pub enum SqlEngine {
   MySql(MySqlPool),
   Postgres(PgPool),
}

impl SqlEngine {
   /// Build an engine for `credential` and open its first connection.
   ///
   /// Fails with [`crate::Error::UnsupportedDialect`] before any network
   /// activity when the dialect identifier is not recognised.
   pub async fn connect(credential: &dyn SqlCredential, settings: &SqlPoolSettings) -> Result<Self> {
      let dialect: Dialect = credential.dialect().parse()?;
      let url = dsn::render(credential, dialect);

      debug!(
         dialect = %dialect,
         dsn = %dsn::render_redacted(credential, dialect),
         "Connecting SQL engine"
      );

      let engine = match dialect {
         Dialect::MySql => {
            let options = with_statement_logging(MySqlConnectOptions::from_str(&url)?, settings);
            let pool = MySqlPoolOptions::new()
               .max_connections(settings.max_open_connections)
               .min_connections(settings.effective_min_connections())
               .idle_timeout(settings.idle_timeout)
               .acquire_timeout(settings.acquire_timeout)
               .connect_with(options)
               .await?;
            SqlEngine::MySql(pool)
         }
         Dialect::Postgres => {
            let options = with_statement_logging(PgConnectOptions::from_str(&url)?, settings);
            let pool = PgPoolOptions::new()
               .max_connections(settings.max_open_connections)
               .min_connections(settings.effective_min_connections())
               .idle_timeout(settings.idle_timeout)
               .acquire_timeout(settings.acquire_timeout)
               .connect_with(options)
               .await?;
            SqlEngine::Postgres(pool)
         }
      };

      Ok(engine)
   }

   pub fn dialect(&self) -> Dialect {
      match self {
         SqlEngine::MySql(_) => Dialect::MySql,
         SqlEngine::Postgres(_) => Dialect::Postgres,
      }
   }

   /// Round-trip to the server on a pooled connection
   pub async fn ping(&self) -> Result<()> {
      match self {
         SqlEngine::MySql(pool) => pool.acquire().await?.ping().await?,
         SqlEngine::Postgres(pool) => pool.acquire().await?.ping().await?,
      }
      trace!(dialect = %self.dialect(), "SQL engine ping ok");
      Ok(())
   }

   /// Close the pool, waiting for checked-out connections to come back
   pub async fn close(&self) {
      match self {
         SqlEngine::MySql(pool) => pool.close().await,
         SqlEngine::Postgres(pool) => pool.close().await,
      }
      debug!(dialect = %self.dialect(), "SQL engine closed");
   }

   pub fn is_closed(&self) -> bool {
      match self {
         SqlEngine::MySql(pool) => pool.is_closed(),
         SqlEngine::Postgres(pool) => pool.is_closed(),
      }
   }

   pub fn as_mysql(&self) -> Option<&MySqlPool> {
      match self {
         SqlEngine::MySql(pool) => Some(pool),
         SqlEngine::Postgres(_) => None,
      }
   }

   pub fn as_postgres(&self) -> Option<&PgPool> {
      match self {
         SqlEngine::Postgres(pool) => Some(pool),
         SqlEngine::MySql(_) => None,
      }
   }
}

/// Statement echo includes elapsed time; slow statements go out again at WARN.
fn with_statement_logging<O: ConnectOptions>(options: O, settings: &SqlPoolSettings) -> O {
   if settings.echo_statements {
      options
         .log_statements(LevelFilter::Info)
         .log_slow_statements(LevelFilter::Warn, settings.slow_statement_threshold)
   } else {
      options.disable_statement_logging()
   }
}

#[cfg(test)]
mod tests {
   use std::time::Duration;

   use super::*;
   use crate::credential::SqlConfig;
   use crate::error::Error;

   fn unreachable(dialect: &str) -> SqlConfig {
      SqlConfig {
         host: "127.0.0.1".into(),
         // Nothing listens on port 1
         port: "1".into(),
         user: "app".into(),
         password: "secret".into(),
         database: "orders".into(),
         dialect: dialect.into(),
      }
   }

   fn quick_settings() -> SqlPoolSettings {
      SqlPoolSettings {
         acquire_timeout: Duration::from_millis(200),
         ..Default::default()
      }
   }

   #[tokio::test]
   async fn unsupported_dialect_fails_before_connecting() {
      let err = SqlEngine::connect(&unreachable("oracle"), &quick_settings())
         .await
         .unwrap_err();

      assert!(matches!(err, Error::UnsupportedDialect(ref d) if d == "oracle"));
      assert!(err.is_terminal());
   }

   #[tokio::test]
   async fn unreachable_mysql_reports_driver_error() {
      let err = SqlEngine::connect(&unreachable("mysql"), &quick_settings())
         .await
         .unwrap_err();

      assert!(matches!(err, Error::Sqlx(_)));
      assert!(!err.is_terminal());
   }

   #[tokio::test]
   async fn unreachable_postgres_reports_driver_error() {
      let err = SqlEngine::connect(&unreachable("postgres"), &quick_settings())
         .await
         .unwrap_err();

      assert!(matches!(err, Error::Sqlx(_)));
   }

   #[tokio::test]
   async fn empty_host_surfaces_as_connection_error() {
      let credential = SqlConfig {
         dialect: "postgres".into(),
         ..Default::default()
      };

      let err = SqlEngine::connect(&credential, &quick_settings())
         .await
         .unwrap_err();

      assert!(matches!(err, Error::Sqlx(_)));
   }
}
