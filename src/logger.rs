//! Caller-supplied logging sink

use std::fmt;
use std::io;
use std::sync::Arc;

use tracing_subscriber::fmt::MakeWriter;

type SinkFn = dyn Fn(fmt::Arguments<'_>) + Send + Sync;

/// A formatted-text sink the registry reports through.
///
/// Receives retry failures and ping failures. Defaults to discarding
/// everything. Cloning shares the same callback.
///
/// # Example
///
/// ```
/// use pool_registry::Logger;
///
/// let logger = Logger::new(|args| eprintln!("db: {args}"));
/// logger.log(format_args!("attempt {} failed", 1));
/// ```
#[derive(Clone, Default)]
pub struct Logger {
   sink: Option<Arc<SinkFn>>,
}

impl Logger {
   pub fn new<F>(sink: F) -> Self
   where
      F: Fn(fmt::Arguments<'_>) + Send + Sync + 'static,
   {
      Self {
         sink: Some(Arc::new(sink)),
      }
   }

   /// A sink that silently discards everything
   pub fn noop() -> Self {
      Self::default()
   }

   /// Forward every message to `tracing` at INFO
   pub fn tracing() -> Self {
      Self::new(|args| tracing::info!(target: "pool_registry", "{}", args))
   }

   pub fn is_noop(&self) -> bool {
      self.sink.is_none()
   }

   pub fn log(&self, args: fmt::Arguments<'_>) {
      if let Some(sink) = &self.sink {
         sink(args);
      }
   }

   /// An `io::Write` adapter feeding this sink.
   ///
   /// Hand it to `tracing_subscriber::fmt().with_writer(..)` to route all
   /// formatted `tracing` output into the same sink.
   pub fn writer(&self) -> LogWriter {
      LogWriter {
         logger: self.clone(),
      }
   }
}

impl fmt::Debug for Logger {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("Logger")
         .field("noop", &self.is_noop())
         .finish()
   }
}

/// Writer that hands each write to a [`Logger`] as one message.
#[derive(Clone, Debug)]
pub struct LogWriter {
   logger: Logger,
}

impl io::Write for LogWriter {
   fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
      let text = String::from_utf8_lossy(buf);
      let text = text.trim_end_matches(['\r', '\n']);
      if !text.is_empty() {
         self.logger.log(format_args!("sql: {}", text));
      }
      Ok(buf.len())
   }

   fn flush(&mut self) -> io::Result<()> {
      Ok(())
   }
}

impl<'a> MakeWriter<'a> for LogWriter {
   type Writer = LogWriter;

   fn make_writer(&'a self) -> Self::Writer {
      self.clone()
   }
}
