//! The connection manager facade

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dbpool_driver::{Database, DriverRegistry};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::engine::{AccessMode, Engine};
use crate::logger::{Logger, NoopLogger};
use crate::opener::{DuckDbOpener, MySqlOpener, OpenContext, Opener, SqliteOpener};
use crate::options::OpenOptions;
use crate::{Error, Result};

/// Single entry point for opening database handles.
///
/// Holds a default engine, a logger and one [`Opener`] per engine. Every call
/// produces a fresh handle that belongs to the caller; the manager keeps no
/// reference to it. Cloning is cheap and clones share the driver registry.
///
/// # Example
///
/// ```no_run
/// use dbpool::{DbManager, Engine};
///
/// # async fn example() -> dbpool::Result<()> {
/// let manager = DbManager::new(Engine::Sqlite, None);
///
/// let mut db = manager.open_writable("app.db").await?;
/// db.execute("CREATE TABLE IF NOT EXISTS users (name TEXT)").await?;
/// db.close().await;
///
/// let reader = manager.open_read_only("app.db").await?;
/// reader.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DbManager {
   default_engine: Engine,
   logger: Arc<dyn Logger>,
   registry: Arc<DriverRegistry>,
   openers: HashMap<Engine, Arc<dyn Opener>>,
}

impl DbManager {
   /// Create a manager using the process-wide [`DriverRegistry::global`].
   ///
   /// `None` for the logger means diagnostic lines are only emitted as
   /// `tracing` events.
   pub fn new(default_engine: Engine, logger: Option<Arc<dyn Logger>>) -> Self {
      let mut openers: HashMap<Engine, Arc<dyn Opener>> = HashMap::new();
      openers.insert(Engine::DuckDb, Arc::new(DuckDbOpener));
      openers.insert(Engine::Sqlite, Arc::new(SqliteOpener));
      openers.insert(Engine::MySql, Arc::new(MySqlOpener));

      Self {
         default_engine,
         logger: logger.unwrap_or_else(|| Arc::new(NoopLogger)),
         registry: DriverRegistry::global(),
         openers,
      }
   }

   /// Use `registry` instead of the process-wide one.
   pub fn with_registry(mut self, registry: Arc<DriverRegistry>) -> Self {
      self.registry = registry;
      self
   }

   /// Install or replace the opener for `engine`.
   pub fn with_opener(mut self, engine: Engine, opener: Arc<dyn Opener>) -> Self {
      self.openers.insert(engine, opener);
      self
   }

   /// Remove the opener for `engine`; opening it then fails as unsupported.
   pub fn without_opener(mut self, engine: Engine) -> Self {
      self.openers.remove(&engine);
      self
   }

   pub fn default_engine(&self) -> Engine {
      self.default_engine
   }

   pub fn registry(&self) -> &Arc<DriverRegistry> {
      &self.registry
   }

   /// Open a handle, retrying transient failures per `opts`.
   pub async fn open(&self, opts: OpenOptions) -> Result<Database> {
      self.open_with_cancel(opts, &CancellationToken::new()).await
   }

   /// Like [`open`](Self::open), but gives up with [`Error::Cancelled`] as soon
   /// as `cancel` fires during a backoff sleep.
   ///
   /// An attempt already in flight is not interrupted.
   pub async fn open_with_cancel(
      &self,
      opts: OpenOptions,
      cancel: &CancellationToken,
   ) -> Result<Database> {
      let engine = opts.engine.unwrap_or(self.default_engine);
      let opener = self
         .openers
         .get(&engine)
         .ok_or_else(|| Error::UnsupportedEngine(engine.to_string()))?;

      if cancel.is_cancelled() {
         return Err(Error::Cancelled {
            engine,
            attempts: 0,
         });
      }

      debug!("Opening {} database ({:?})", engine, opts.mode);

      let opts = OpenOptions {
         engine: Some(engine),
         ..opts
      };
      let ctx = OpenContext::new(&self.registry, self.logger.as_ref(), cancel);
      opener.open(&ctx, &opts).await
   }

   pub async fn open_read_only(&self, path: impl Into<String>) -> Result<Database> {
      self
         .open(OpenOptions {
            mode: AccessMode::ReadOnly,
            ..OpenOptions::new(path)
         })
         .await
   }

   pub async fn open_writable(&self, path: impl Into<String>) -> Result<Database> {
      self
         .open(OpenOptions {
            mode: AccessMode::ReadWrite,
            ..OpenOptions::new(path)
         })
         .await
   }

   /// Open a file that was just created and so cannot be locked by anyone
   /// else yet. Makes exactly one attempt and never sleeps.
   pub async fn open_new(&self, path: impl Into<String>) -> Result<Database> {
      self
         .open(OpenOptions {
            mode: AccessMode::ReadWrite,
            max_retries: 1,
            ..OpenOptions::new(path)
         })
         .await
   }
}

impl fmt::Debug for DbManager {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      let mut engines: Vec<&str> = self.openers.keys().map(Engine::as_str).collect();
      engines.sort_unstable();

      f.debug_struct("DbManager")
         .field("default_engine", &self.default_engine)
         .field("engines", &engines)
         .field("registry", &self.registry)
         .finish_non_exhaustive()
   }
}
