//! Resolution through `Databases` with real factories.
//!
//! No servers are required: every credential points at a closed local port,
//! so these tests cover the failure paths end to end.

use std::sync::Arc;
use std::time::Duration;

use pool_registry::{
   CacheConfig, CachePoolSettings, Databases, Error, RetryPolicy, SqlConfig, SqlPoolSettings,
};

fn sql(dialect: &str) -> Arc<SqlConfig> {
   Arc::new(SqlConfig {
      host: "127.0.0.1".into(),
      // Nothing listens on port 1
      port: "1".into(),
      user: "app".into(),
      password: "secret".into(),
      database: "orders".into(),
      dialect: dialect.into(),
   })
}

fn cache() -> Arc<CacheConfig> {
   Arc::new(CacheConfig {
      host: "127.0.0.1".into(),
      port: "1".into(),
      auth: "secret".into(),
   })
}

fn fast_failing() -> Databases {
   Databases::builder()
      .retry(RetryPolicy {
         max_attempts: 2,
         delay: Duration::from_millis(10),
         ..Default::default()
      })
      .sql_settings(SqlPoolSettings {
         acquire_timeout: Duration::from_millis(200),
         ..Default::default()
      })
      .build()
}

#[tokio::test]
async fn test_unknown_names_are_config_missing() {
   let databases = Databases::new();

   let err = databases.get_engine("primary").await.unwrap_err();
   assert!(matches!(err, Error::ConfigMissing(_)));

   let err = databases.get_pool("cache1").await.unwrap_err();
   assert!(matches!(err, Error::ConfigMissing(_)));
}

#[tokio::test]
async fn test_sql_and_cache_names_are_separate() {
   let databases = Databases::new();
   databases.register_sql_credential("shared", sql("mysql"));

   assert!(databases.sql().is_registered("shared"));
   assert!(!databases.cache().is_registered("shared"));

   let err = databases.get_pool("shared").await.unwrap_err();
   assert_eq!(err.error_code(), "CONFIG_MISSING");
}

#[tokio::test]
async fn test_unsupported_dialect_is_reported() {
   let databases = Databases::new();
   databases.register_sql_credential("legacy", sql("mssql"));

   let err = databases.get_engine("legacy").await.unwrap_err();

   assert!(matches!(err, Error::UnsupportedDialect(ref d) if d == "mssql"));
   assert_eq!(err.to_string(), "unsupported driver 'mssql': only mysql and postgres are supported");
}

#[tokio::test]
async fn test_unreachable_sql_backend_fails_after_retries() {
   let databases = fast_failing();
   databases.register_sql_credential("primary", sql("postgres"));

   let err = databases.get_engine("primary").await.unwrap_err();

   assert!(matches!(err, Error::Sql(_)));
   assert!(!err.is_terminal());
   assert!(databases.sql().cached_names().is_empty());
}

#[tokio::test]
async fn test_unreachable_cache_backend_fails_when_verified() {
   let databases = fast_failing();
   databases.register_cache_credential("cache1", cache());

   let err = databases.get_pool("cache1").await.unwrap_err();

   assert!(matches!(err, Error::Cache(_)));
   assert_eq!(err.error_code(), "CACHE_CONNECT_FAILURE");
}

#[tokio::test]
async fn test_lazy_cache_pool_is_cached_without_server() {
   let databases = Databases::builder()
      .cache_settings(CachePoolSettings {
         verify_on_build: false,
         ..Default::default()
      })
      .build();
   databases.register_cache_credential("cache1", cache());

   let first = databases.get_pool("cache1").await.unwrap();
   let second = databases.get_pool("cache1").await.unwrap();

   assert!(Arc::ptr_eq(&first, &second));
   assert_eq!(first.address(), "127.0.0.1:1");

   databases.close_all().await;
   assert!(first.is_closed());
   assert!(databases.cache().cached_names().is_empty());
}
