//! Routes sqlx statement echo into registry loggers

use std::fmt::{self, Write as _};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{LazyLock, OnceLock};

use parking_lot::RwLock;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use crate::logger::Logger;

/// Target sqlx emits statement logs under
pub const STATEMENT_TARGET: &str = "sqlx::query";

static SINKS: LazyLock<Sinks> = LazyLock::new(Sinks::default);
static GLOBAL_INSTALL: OnceLock<bool> = OnceLock::new();

#[derive(Default)]
struct Sinks {
   next_id: AtomicU64,
   loggers: RwLock<Vec<(u64, Logger)>>,
}

/// A `tracing` layer forwarding sqlx statement events to every registered sink.
///
/// Installed as the global subscriber by the first [`crate::Databases`] with a
/// logger. Applications that set up their own subscriber add this layer to it:
///
/// ```no_run
/// use tracing_subscriber::layer::SubscriberExt;
///
/// let subscriber = tracing_subscriber::registry().with(pool_registry::statement_echo_layer());
/// tracing::subscriber::set_global_default(subscriber).ok();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementEchoLayer;

pub fn statement_echo_layer() -> StatementEchoLayer {
   StatementEchoLayer
}

impl<S: Subscriber> Layer<S> for StatementEchoLayer {
   fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
      if event.metadata().target() != STATEMENT_TARGET {
         return;
      }

      let loggers: Vec<Logger> = SINKS
         .loggers
         .read()
         .iter()
         .map(|(_, logger)| logger.clone())
         .collect();
      if loggers.is_empty() {
         return;
      }

      let mut line = EventLine::default();
      event.record(&mut line);
      for logger in &loggers {
         logger.log(format_args!("sql: {}", line.0));
      }
   }
}

/// Renders an event as `message name=value ...`
#[derive(Default)]
struct EventLine(String);

impl EventLine {
   fn separate(&mut self) {
      if !self.0.is_empty() {
         self.0.push(' ');
      }
   }
}

impl Visit for EventLine {
   fn record_str(&mut self, field: &Field, value: &str) {
      self.separate();
      if field.name() == "message" {
         self.0.push_str(value);
      } else {
         let _ = write!(self.0, "{}={}", field.name(), value);
      }
   }

   fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
      self.separate();
      if field.name() == "message" {
         let _ = write!(self.0, "{:?}", value);
      } else {
         let _ = write!(self.0, "{}={:?}", field.name(), value);
      }
   }
}

/// Keeps a logger subscribed to statement echo; unsubscribes on drop.
#[derive(Debug)]
pub(crate) struct EchoRegistration {
   id: u64,
}

impl EchoRegistration {
   pub(crate) fn register(logger: Logger) -> Self {
      let id = SINKS.next_id.fetch_add(1, Ordering::Relaxed);
      SINKS.loggers.write().push((id, logger));
      install_global();
      Self { id }
   }
}

impl Drop for EchoRegistration {
   fn drop(&mut self) {
      SINKS.loggers.write().retain(|(id, _)| *id != self.id);
   }
}

/// Try once per process to make the echo layer the global subscriber.
///
/// Returns false when the application had already installed its own.
pub fn install_global() -> bool {
   *GLOBAL_INSTALL.get_or_init(|| {
      let subscriber = tracing_subscriber::registry().with(StatementEchoLayer);
      let installed = tracing::subscriber::set_global_default(subscriber).is_ok();
      if !installed {
         tracing::debug!("Global subscriber already set; add statement_echo_layer() to it");
      }
      installed
   })
}
