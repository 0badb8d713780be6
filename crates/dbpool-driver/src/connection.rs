//! Driver and connection traits, and the owning [`Database`] handle

use crate::Result;
use crate::config::PoolShape;
use futures::future::BoxFuture;
use std::any::Any;
use std::fmt;

/// A database driver registered under a name in a [`DriverRegistry`](crate::DriverRegistry)
///
/// Opening is lazy: `open` only validates and records the connection string.
/// Nothing touches the database until the returned connection is pinged or
/// used, so the caller gets a chance to configure the pool shape first.
pub trait Driver: Send + Sync {
   /// Parse `conn_str` and return an unconnected handle
   fn open(&self, conn_str: &str) -> Result<Box<dyn Connection>>;
}

/// A lazily connected handle produced by a [`Driver`]
pub trait Connection: Send + Sync + fmt::Debug {
   /// Set the pool limits used when the underlying pool is (re)built
   fn set_pool_shape(&mut self, shape: PoolShape);

   /// Pool limits currently in effect
   fn pool_shape(&self) -> PoolShape;

   /// Establish the connection if needed and verify it is alive
   fn ping(&mut self) -> BoxFuture<'_, Result<()>>;

   /// Execute a statement that produces no rows of interest
   fn execute<'a>(&'a mut self, sql: &'a str) -> BoxFuture<'a, Result<()>>;

   /// Close all connections held by this handle
   fn close(self: Box<Self>) -> BoxFuture<'static, ()>;

   /// Access to the concrete connection type
   fn as_any(&self) -> &dyn Any;
}

/// An open database handle, owned entirely by the caller
///
/// Dropping the handle releases its connections; [`Database::close`] does the
/// same but waits until they are gone.
///
/// # Example
///
/// ```no_run
/// use dbpool_driver::{Database, DriverRegistry, SqliteHandle};
///
/// # async fn example() -> dbpool_driver::Result<()> {
/// let driver = DriverRegistry::global().get("sqlite")?;
/// let mut db = Database::new("sqlite", driver.open("app.db")?);
/// db.ping().await?;
///
/// let pool = db.downcast_ref::<SqliteHandle>().unwrap().pool()?;
/// sqlx::query("CREATE TABLE IF NOT EXISTS t (id INTEGER)").execute(pool).await?;
///
/// db.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Database {
   driver_name: String,
   conn: Box<dyn Connection>,
}

impl Database {
   /// Wrap a driver connection opened under `driver_name`
   pub fn new(driver_name: impl Into<String>, conn: Box<dyn Connection>) -> Self {
      Self {
         driver_name: driver_name.into(),
         conn,
      }
   }

   /// Name of the registered driver that produced this handle
   pub fn driver_name(&self) -> &str {
      &self.driver_name
   }

   pub fn pool_shape(&self) -> PoolShape {
      self.conn.pool_shape()
   }

   pub fn set_pool_shape(&mut self, shape: PoolShape) {
      self.conn.set_pool_shape(shape);
   }

   pub async fn ping(&mut self) -> Result<()> {
      self.conn.ping().await
   }

   pub async fn execute(&mut self, sql: &str) -> Result<()> {
      self.conn.execute(sql).await
   }

   /// Close the handle and wait for its connections to be released
   pub async fn close(self) {
      self.conn.close().await;
   }

   /// Borrow the concrete driver connection, e.g. [`SqliteHandle`](crate::SqliteHandle)
   pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
      self.conn.as_any().downcast_ref::<T>()
   }
}
