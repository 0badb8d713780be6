use dbpool_driver::{Database, Driver};
use futures::future::BoxFuture;
use tracing::debug;

use super::{OpenContext, Opener, configure_pool, connect};
use crate::engine::{AccessMode, Engine};
use crate::options::OpenOptions;
use crate::{Error, Result};

/// Opens DuckDB files, checkpointing a leftover WAL when a read-only open fails.
///
/// DuckDB refuses read-only access to a file whose write-ahead log has not
/// been checkpointed, because replaying it needs write access. A writer that
/// exited without checkpointing leaves the file in exactly that state. On the
/// first failed read-only attempt of a call the file is opened read-write once
/// and `CHECKPOINT` is run; whether that works or not, the retry loop carries on.
#[derive(Debug, Default, Clone, Copy)]
pub struct DuckDbOpener;

impl Opener for DuckDbOpener {
   fn open<'a>(
      &'a self,
      ctx: &'a OpenContext<'a>,
      opts: &'a OpenOptions,
   ) -> BoxFuture<'a, Result<Database>> {
      Box::pin(open_duckdb(ctx, opts))
   }
}

pub fn duckdb_connection_string(path: &str, mode: AccessMode) -> String {
   match mode {
      AccessMode::ReadOnly => format!("{}?access_mode=read_only", path),
      AccessMode::ReadWrite => path.to_string(),
   }
}

async fn open_duckdb(ctx: &OpenContext<'_>, opts: &OpenOptions) -> Result<Database> {
   let engine = Engine::DuckDb;
   let driver = ctx.driver(engine)?;
   let policy = opts.retry_policy();
   let conn_str = duckdb_connection_string(&opts.path, opts.mode);

   let mut checkpointed = false;
   let mut attempt = 0;

   loop {
      let err = match connect(driver.as_ref(), engine.as_str(), &conn_str).await {
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

      if opts.mode.is_read_only() && !checkpointed {
         checkpointed = true;
         checkpoint_wal(ctx, driver.as_ref(), &opts.path).await;
      }

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

/// Flush the WAL into the main file. Failure is logged and otherwise ignored.
async fn checkpoint_wal(ctx: &OpenContext<'_>, driver: &dyn Driver, path: &str) {
   // A read-write open would create a missing file
   if !tokio::fs::try_exists(path).await.unwrap_or(false) {
      ctx.info(&format!(
         "WAL checkpoint for '{}' skipped: database file does not exist",
         path
      ));
      return;
   }

   debug!("Attempting WAL checkpoint for '{}'", path);

   match run_checkpoint(driver, path).await {
      Ok(()) => ctx.info(&format!("WAL checkpoint for '{}' succeeded", path)),
      Err(e) => ctx.warn(&format!("WAL checkpoint for '{}' failed: {}", path, e)),
   }
}

async fn run_checkpoint(driver: &dyn Driver, path: &str) -> dbpool_driver::Result<()> {
   let mut db = Database::new(Engine::DuckDb.as_str(), driver.open(path)?);
   configure_pool(&mut db);

   let result = db.execute("CHECKPOINT").await;
   db.close().await;
   result
}
