use dbpool_driver::Database;
use futures::future::BoxFuture;
use tracing::debug;

use super::{OpenContext, Opener, connect};
use crate::engine::{AccessMode, Engine};
use crate::options::OpenOptions;
use crate::{Error, Result};

/// Opens SQLite files in WAL mode with a driver-level busy timeout.
///
/// The busy timeout absorbs short lock contention inside the driver; the retry
/// loop here covers contention that outlasts it. Which registered driver name
/// is used is decided once per registry by
/// [`DriverRegistry::resolve_sqlite_driver`](dbpool_driver::DriverRegistry::resolve_sqlite_driver).
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteOpener;

impl Opener for SqliteOpener {
   fn open<'a>(
      &'a self,
      ctx: &'a OpenContext<'a>,
      opts: &'a OpenOptions,
   ) -> BoxFuture<'a, Result<Database>> {
      Box::pin(open_sqlite(ctx, opts))
   }
}

pub fn sqlite_connection_string(path: &str, mode: AccessMode) -> String {
   let mut conn_str = format!("{}?_journal_mode=WAL&_busy_timeout=5000", path);
   if mode.is_read_only() {
      conn_str.push_str("&mode=ro");
   }
   conn_str
}

async fn open_sqlite(ctx: &OpenContext<'_>, opts: &OpenOptions) -> Result<Database> {
   let engine = Engine::Sqlite;

   // A missing driver is a deployment problem; retrying cannot fix it
   let Some(driver_name) = ctx.registry().resolve_sqlite_driver().await else {
      return Err(Error::NoSqliteDriver);
   };
   let driver = ctx.registry().get(&driver_name)?;
   debug!("Opening SQLite '{}' with driver '{}'", opts.path, driver_name);

   let policy = opts.retry_policy();
   let conn_str = sqlite_connection_string(&opts.path, opts.mode);
   let mut attempt = 0;

   loop {
      let err = match connect(driver.as_ref(), &driver_name, &conn_str).await {
         Ok(db) => return Ok(db),
         Err(e) => e,
      };

      ctx.warn(&format!(
         "{} attempt {}/{} failed: {}",
         engine.label(),
         attempt + 1,
         policy.max_retries,
         err
      ));

      if !policy.has_next(attempt) {
         return Err(Error::OpenFailed {
            engine,
            path: opts.path.clone(),
            retries: policy.max_retries,
            source: err,
         });
      }

      ctx.backoff(engine, &policy, attempt).await?;
      attempt += 1;
   }
}
