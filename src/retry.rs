//! Bounded, flat-delay retry around pool construction

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::logger::Logger;

/// How many times a build is attempted and how long to wait in between.
///
/// The delay is flat: no exponential growth, no jitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
   /// Total attempts, including the first
   ///
   /// Default: 5
   pub max_attempts: u32,

   /// Pause between consecutive attempts
   ///
   /// Default: 200 milliseconds
   pub delay: Duration,

   /// Keep retrying errors classified as terminal (unsupported dialect).
   ///
   /// Off by default, so a terminal error surfaces after the first attempt.
   pub retry_terminal_errors: bool,
}

impl RetryPolicy {
   /// Exactly one attempt
   pub fn no_retry() -> Self {
      Self {
         max_attempts: 1,
         ..Default::default()
      }
   }
}

impl Default for RetryPolicy {
   fn default() -> Self {
      Self {
         max_attempts: 5,
         delay: Duration::from_millis(200),
         retry_terminal_errors: false,
      }
   }
}

/// Run `attempt` until it succeeds or the policy gives up.
///
/// `attempt` receives the 1-based attempt number. Every failure is reported
/// to `logger` before the next try; when attempts run out the last error is
/// returned unchanged.
pub async fn with_retry<T, F, Fut>(
   policy: &RetryPolicy,
   logger: &Logger,
   name: &str,
   mut attempt: F,
) -> Result<T>
where
   F: FnMut(u32) -> Fut,
   Fut: Future<Output = Result<T>>,
{
   let max_attempts = policy.max_attempts.max(1);
   let mut number = 1;

   loop {
      match attempt(number).await {
         Ok(value) => {
            if number > 1 {
               debug!(db = name, attempt = number, "Build succeeded after retry");
            }
            return Ok(value);
         }
         Err(err) => {
            warn!(db = name, attempt = number, max_attempts, error = %err, "Build attempt failed");
            logger.log(format_args!(
               "{}: attempt {}/{} failed: {}",
               name, number, max_attempts, err
            ));

            let give_up = number >= max_attempts || (err.is_terminal() && !policy.retry_terminal_errors);
            if give_up {
               return Err(err);
            }
         }
      }

      tokio::time::sleep(policy.delay).await;
      number += 1;
   }
}
