//! Per-engine open strategies and the helpers they share.
//!
//! Every opener runs the same outer protocol: connect, apply the single
//! connection pool shape, ping, and on failure log, back off linearly and try
//! again until the retry budget is spent. Engines differ in how they build the
//! connection string and in what they do between attempts.

use std::sync::Arc;

use dbpool_driver::{Database, Driver, DriverRegistry, PoolShape};
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::Engine;
use crate::logger::Logger;
use crate::options::{OpenOptions, RetryPolicy};
use crate::{Error, Result};

mod duckdb;
mod mysql;
mod sqlite;

pub use duckdb::{DuckDbOpener, duckdb_connection_string};
pub use mysql::{MySqlOpener, redact_dsn};
pub use sqlite::{SqliteOpener, sqlite_connection_string};

/// A "connect with these options" strategy for one engine.
///
/// [`DbManager`](crate::DbManager) keeps one opener per [`Engine`] and
/// dispatches to it; custom openers can be installed with
/// [`DbManager::with_opener`](crate::DbManager::with_opener).
pub trait Opener: Send + Sync {
   fn open<'a>(
      &'a self,
      ctx: &'a OpenContext<'a>,
      opts: &'a OpenOptions,
   ) -> BoxFuture<'a, Result<Database>>;
}

/// What an opener may use while running: drivers, the caller's logger and the
/// cancellation token for backoff sleeps.
pub struct OpenContext<'a> {
   registry: &'a DriverRegistry,
   logger: &'a dyn Logger,
   cancel: &'a CancellationToken,
}

impl<'a> OpenContext<'a> {
   pub fn new(
      registry: &'a DriverRegistry,
      logger: &'a dyn Logger,
      cancel: &'a CancellationToken,
   ) -> Self {
      Self {
         registry,
         logger,
         cancel,
      }
   }

   pub fn registry(&self) -> &DriverRegistry {
      self.registry
   }

   /// The driver registered under the engine's identifier.
   pub fn driver(&self, engine: Engine) -> Result<Arc<dyn Driver>> {
      self
         .registry
         .get(engine.as_str())
         .map_err(|_| Error::DriverNotRegistered {
            engine,
            name: engine.as_str().to_string(),
         })
   }

   /// Report a failure to both tracing and the caller's logger.
   pub fn warn(&self, line: &str) {
      warn!("{}", line);
      self.logger.log(line);
   }

   pub fn info(&self, line: &str) {
      info!("{}", line);
      self.logger.log(line);
   }

   /// Sleep out the backoff after failed `attempt`, unless cancelled first.
   pub async fn backoff(&self, engine: Engine, policy: &RetryPolicy, attempt: u32) -> Result<()> {
      let delay = policy.delay(attempt);
      debug!("Retrying {} open in {:?}", engine, delay);

      tokio::select! {
         biased;
         _ = self.cancel.cancelled() => Err(Error::Cancelled {
            engine,
            attempts: attempt + 1,
         }),
         _ = tokio::time::sleep(delay) => Ok(()),
      }
   }
}

/// Limit a handle to one connection that is closed as soon as it is released,
/// so the OS file lock goes away the moment the caller stops using it.
pub fn configure_pool(db: &mut Database) {
   db.set_pool_shape(PoolShape::SINGLE);
}

/// One attempt: open, shape the pool, ping. The handle is closed on failure.
pub(crate) async fn connect(
   driver: &dyn Driver,
   driver_name: &str,
   conn_str: &str,
) -> dbpool_driver::Result<Database> {
   let mut db = Database::new(driver_name, driver.open(conn_str)?);
   configure_pool(&mut db);

   if let Err(e) = db.ping().await {
      db.close().await;
      return Err(e);
   }

   Ok(db)
}
