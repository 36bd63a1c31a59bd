//! SQL backend credentials and dialect identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Dialect identifier for MySQL credentials
pub const MYSQL: &str = "mysql";

/// Dialect identifier for PostgreSQL credentials
pub const POSTGRES: &str = "postgres";

/// The SQL backend variant, deciding DSN grammar and driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
   MySql,
   Postgres,
}

impl Dialect {
   /// The identifier credentials use to select this dialect
   pub fn as_str(&self) -> &'static str {
      match self {
         Dialect::MySql => MYSQL,
         Dialect::Postgres => POSTGRES,
      }
   }
}

impl FromStr for Dialect {
   type Err = Error;

   fn from_str(s: &str) -> Result<Self> {
      match s {
         MYSQL => Ok(Dialect::MySql),
         POSTGRES => Ok(Dialect::Postgres),
         other => Err(Error::UnsupportedDialect(other.to_string())),
      }
   }
}

impl fmt::Display for Dialect {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.as_str())
   }
}

/// Accessors a SQL credential must expose.
///
/// Values are handed over as-is; nothing here validates them. An empty host
/// or port only shows up later as a connection failure.
pub trait SqlCredential: Send + Sync {
   fn host(&self) -> &str;
   fn port(&self) -> &str;
   fn user(&self) -> &str;
   fn password(&self) -> &str;
   fn database(&self) -> &str;
   /// Dialect identifier, expected to be [`MYSQL`] or [`POSTGRES`]
   fn dialect(&self) -> &str;
}

/// Plain-data SQL credential
///
/// # Examples
///
/// ```
/// use sqlx_engine_mgr::{SqlConfig, SqlCredential};
///
/// let config = SqlConfig {
///    host: "127.0.0.1".into(),
///    port: "5432".into(),
///    user: "app".into(),
///    password: "secret".into(),
///    database: "orders".into(),
///    dialect: "postgres".into(),
/// };
///
/// assert_eq!(config.dialect(), "postgres");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlConfig {
   pub host: String,
   pub port: String,
   pub user: String,
   pub password: String,
   pub database: String,
   pub dialect: String,
}

impl SqlCredential for SqlConfig {
   fn host(&self) -> &str {
      &self.host
   }

   fn port(&self) -> &str {
      &self.port
   }

   fn user(&self) -> &str {
      &self.user
   }

   fn password(&self) -> &str {
      &self.password
   }

   fn database(&self) -> &str {
      &self.database
   }

   fn dialect(&self) -> &str {
      &self.dialect
   }
}

impl fmt::Debug for SqlConfig {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("SqlConfig")
         .field("host", &self.host)
         .field("port", &self.port)
         .field("user", &self.user)
         .field("password", &"***")
         .field("database", &self.database)
         .field("dialect", &self.dialect)
         .finish()
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn parses_supported_dialects() {
      assert_eq!("mysql".parse::<Dialect>().unwrap(), Dialect::MySql);
      assert_eq!("postgres".parse::<Dialect>().unwrap(), Dialect::Postgres);
   }

   #[test]
   fn rejects_other_dialects() {
      for id in ["sqlite", "MySQL", "postgresql", ""] {
         match id.parse::<Dialect>() {
            Err(Error::UnsupportedDialect(got)) => assert_eq!(got, id),
            other => panic!("expected UnsupportedDialect for {id:?}, got {other:?}"),
         }
      }
   }

   #[test]
   fn debug_hides_password() {
      let config = SqlConfig {
         password: "hunter2".into(),
         ..Default::default()
      };

      let rendered = format!("{config:?}");
      assert!(!rendered.contains("hunter2"));
      assert!(rendered.contains("***"));
   }

   #[test]
   fn deserializes_from_json() {
      let config: SqlConfig = serde_json::from_str(
         r#"{"host":"db","port":"3306","user":"u","password":"p","database":"d","dialect":"mysql"}"#,
      )
      .unwrap();

      assert_eq!(config.host(), "db");
      assert_eq!(config.dialect().parse::<Dialect>().unwrap(), Dialect::MySql);
   }
}
