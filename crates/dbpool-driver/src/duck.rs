//! DuckDB driver built on the `duckdb` crate

use crate::Result;
use crate::config::PoolShape;
use crate::connection::{Connection, Driver};
use crate::error::Error;
use duckdb::{AccessMode, Config};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

/// Opens DuckDB files from `<path>[?access_mode=read_only|read_write|automatic]`
#[derive(Debug, Default, Clone, Copy)]
pub struct DuckDbDriver;

impl Driver for DuckDbDriver {
   fn open(&self, conn_str: &str) -> Result<Box<dyn Connection>> {
      let (path, access_mode) = parse_connection_string(conn_str)?;

      Ok(Box::new(DuckDbHandle {
         path,
         access_mode,
         shape: PoolShape::default(),
         conn: None,
      }))
   }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
   Automatic,
   ReadOnly,
   ReadWrite,
}

fn parse_connection_string(conn_str: &str) -> Result<(Option<PathBuf>, Access)> {
   let (path, query) = match conn_str.split_once('?') {
      Some((path, query)) => (path, Some(query)),
      None => (conn_str, None),
   };

   let mut access = Access::Automatic;
   for pair in query.into_iter().flat_map(|q| q.split('&')).filter(|p| !p.is_empty()) {
      access = match pair.split_once('=') {
         Some(("access_mode", "read_only")) => Access::ReadOnly,
         Some(("access_mode", "read_write")) => Access::ReadWrite,
         Some(("access_mode", "automatic")) => Access::Automatic,
         _ => {
            return Err(Error::InvalidConnectionString(format!(
               "unsupported DuckDB parameter '{}'",
               pair
            )));
         }
      };
   }

   let path = match path {
      "" | ":memory:" => None,
      path => Some(PathBuf::from(path)),
   };

   Ok((path, access))
}

/// Single DuckDB connection, opened on first use
///
/// DuckDB connections are synchronous, so every call runs on the blocking pool.
#[derive(Debug)]
pub struct DuckDbHandle {
   path: Option<PathBuf>,
   access_mode: Access,
   shape: PoolShape,
   conn: Option<Arc<Mutex<duckdb::Connection>>>,
}

impl DuckDbHandle {
   /// Run `f` against the underlying connection on the blocking pool
   pub async fn with_connection<T, F>(&self, f: F) -> Result<T>
   where
      T: Send + 'static,
      F: FnOnce(&duckdb::Connection) -> duckdb::Result<T> + Send + 'static,
   {
      let conn = Arc::clone(self.conn.as_ref().ok_or(Error::NotConnected)?);
      let value = tokio::task::spawn_blocking(move || f(&conn.lock())).await??;
      Ok(value)
   }

   async fn connect(&mut self) -> Result<()> {
      if self.conn.is_some() {
         return Ok(());
      }

      let path = self.path.clone();
      let access = self.access_mode;
      let conn = tokio::task::spawn_blocking(move || {
         let config = match access {
            Access::Automatic => Config::default().access_mode(AccessMode::Automatic)?,
            Access::ReadOnly => Config::default().access_mode(AccessMode::ReadOnly)?,
            Access::ReadWrite => Config::default().access_mode(AccessMode::ReadWrite)?,
         };

         match path {
            Some(path) => duckdb::Connection::open_with_flags(path, config),
            None => duckdb::Connection::open_in_memory_with_flags(config),
         }
      })
      .await??;

      self.conn = Some(Arc::new(Mutex::new(conn)));
      Ok(())
   }

   async fn run_batch(&mut self, sql: String) -> Result<()> {
      self.connect().await?;
      self.with_connection(move |conn| conn.execute_batch(&sql)).await
   }
}

impl Connection for DuckDbHandle {
   // A DuckDB handle is one connection; the shape is recorded, not enforced
   fn set_pool_shape(&mut self, shape: PoolShape) {
      self.shape = shape;
   }

   fn pool_shape(&self) -> PoolShape {
      self.shape
   }

   fn ping(&mut self) -> BoxFuture<'_, Result<()>> {
      Box::pin(self.run_batch("SELECT 1".to_string()))
   }

   fn execute<'a>(&'a mut self, sql: &'a str) -> BoxFuture<'a, Result<()>> {
      Box::pin(self.run_batch(sql.to_string()))
   }

   fn close(self: Box<Self>) -> BoxFuture<'static, ()> {
      Box::pin(async move {
         let Some(conn) = self.conn else {
            return;
         };
         // Dropping the last reference closes the file; do it off the async thread
         let _ = tokio::task::spawn_blocking(move || drop(conn)).await;
      })
   }

   fn as_any(&self) -> &dyn Any {
      self
   }
}
