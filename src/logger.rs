/// Sink for the human-readable diagnostic lines the openers produce.
///
/// Any `Fn(&str) + Send + Sync` closure is a logger. Lines arrive one at a time
/// from whichever task is running `open`; nothing here serializes calls made
/// by concurrent `open` calls.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use dbpool::{DbManager, Engine, Logger};
///
/// let logger: Arc<dyn Logger> = Arc::new(|line: &str| eprintln!("db: {line}"));
/// let manager = DbManager::new(Engine::Sqlite, Some(logger));
/// ```
pub trait Logger: Send + Sync {
   fn log(&self, line: &str);
}

impl<F> Logger for F
where
   F: Fn(&str) + Send + Sync,
{
   fn log(&self, line: &str) {
      self(line)
   }
}

/// Logger that drops every line; used when no logger is supplied.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
   fn log(&self, _line: &str) {}
}
