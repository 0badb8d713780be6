//! SQLite driver built on sqlx

use crate::Result;
use crate::config::{PoolShape, retire_pool};
use crate::connection::{Connection, Driver};
use crate::error::Error;
use futures::future::BoxFuture;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{Connection as _, Pool, Sqlite};
use std::any::Any;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Opens SQLite databases from `<path>[?key=value&...]` connection strings
///
/// Recognised keys:
///
/// - `_journal_mode` - journal mode applied on read-write connections (`WAL`, `DELETE`, ...)
/// - `_busy_timeout` - busy timeout in milliseconds
/// - `mode` - `ro`, `rw`, `rwc` or `memory`
///
/// Without a `mode` key missing files are created. A path of `:memory:` (or an
/// empty path) opens a private in-memory database.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDriver;

impl Driver for SqliteDriver {
   fn open(&self, conn_str: &str) -> Result<Box<dyn Connection>> {
      let options = parse_connection_string(conn_str)?;
      Ok(Box::new(SqliteHandle::new(options)))
   }
}

/// Lazily connected SQLite handle
///
/// The pool is built on the first [`Connection::ping`] using the pool shape in
/// effect at that moment.
#[derive(Debug)]
pub struct SqliteHandle {
   options: SqliteConnectOptions,
   shape: PoolShape,
   pool: Option<SqlitePool>,
}

impl SqliteHandle {
   fn new(options: SqliteConnectOptions) -> Self {
      Self {
         options,
         shape: PoolShape::default(),
         pool: None,
      }
   }

   /// The live pool, for running queries through sqlx
   pub fn pool(&self) -> Result<&Pool<Sqlite>> {
      self.pool.as_ref().ok_or(Error::NotConnected)
   }

   fn connect_pool(&mut self) -> &SqlitePool {
      let shape = self.shape;
      let options = self.options.clone();
      self.pool.get_or_insert_with(|| build_pool(shape, options))
   }
}

fn build_pool(shape: PoolShape, options: SqliteConnectOptions) -> SqlitePool {
   let mut pool_options = SqlitePoolOptions::new()
      .max_connections(shape.max_open)
      .min_connections(0);

   // Closing on release drops the file lock as soon as a query finishes
   if shape.closes_on_release() {
      pool_options = pool_options.after_release(|_conn, _meta| Box::pin(async { Ok(false) }));
   }

   pool_options.connect_lazy_with(options)
}

impl Connection for SqliteHandle {
   fn set_pool_shape(&mut self, shape: PoolShape) {
      self.shape = shape;
      // Rebuilt with the new shape on next use
      if let Some(pool) = self.pool.take() {
         retire_pool(pool);
      }
   }

   fn pool_shape(&self) -> PoolShape {
      self.shape
   }

   fn ping(&mut self) -> BoxFuture<'_, Result<()>> {
      Box::pin(async move {
         let pool = self.connect_pool();
         let mut conn = pool.acquire().await?;
         conn.ping().await?;
         Ok(())
      })
   }

   fn execute<'a>(&'a mut self, sql: &'a str) -> BoxFuture<'a, Result<()>> {
      Box::pin(async move {
         let pool = self.connect_pool();
         sqlx::query(sql).execute(pool).await?;
         Ok(())
      })
   }

   fn close(self: Box<Self>) -> BoxFuture<'static, ()> {
      Box::pin(async move {
         if let Some(pool) = self.pool {
            pool.close().await;
         }
      })
   }

   fn as_any(&self) -> &dyn Any {
      self
   }
}

/// Translate a `<path>?k=v&...` connection string into sqlx options
pub(crate) fn parse_connection_string(conn_str: &str) -> Result<SqliteConnectOptions> {
   let (path, query) = match conn_str.split_once('?') {
      Some((path, query)) => (path, Some(query)),
      None => (conn_str, None),
   };

   let mut options = if path.is_empty() || path == ":memory:" {
      SqliteConnectOptions::from_str("sqlite::memory:")?
   } else {
      SqliteConnectOptions::new().filename(path)
   };

   let mut journal_mode = None;
   let mut read_only = false;
   let mut create_if_missing = true;

   for pair in query.into_iter().flat_map(|q| q.split('&')).filter(|p| !p.is_empty()) {
      let (key, value) = pair.split_once('=').unwrap_or((pair, ""));

      match key {
         "_journal_mode" => {
            let mode = SqliteJournalMode::from_str(value).map_err(|_| {
               Error::InvalidConnectionString(format!("unknown journal mode '{}'", value))
            })?;
            journal_mode = Some(mode);
         }
         "_busy_timeout" => {
            let ms: u64 = value.parse().map_err(|_| {
               Error::InvalidConnectionString(format!("busy timeout '{}' is not a number", value))
            })?;
            options = options.busy_timeout(Duration::from_millis(ms));
         }
         "mode" => match value {
            "ro" => {
               read_only = true;
               create_if_missing = false;
            }
            "rw" => create_if_missing = false,
            "rwc" => create_if_missing = true,
            "memory" => options = options.in_memory(true),
            other => {
               return Err(Error::InvalidConnectionString(format!(
                  "unknown mode '{}'",
                  other
               )));
            }
         },
         other => {
            return Err(Error::InvalidConnectionString(format!(
               "unknown parameter '{}'",
               other
            )));
         }
      }
   }

   // Changing the journal mode needs write access
   if let Some(mode) = journal_mode
      && !read_only
   {
      options = options.journal_mode(mode);
   }

   debug!(
      "Parsed SQLite connection string for '{}' (read_only={})",
      path, read_only
   );

   Ok(options
      .read_only(read_only)
      .create_if_missing(create_if_missing))
}
