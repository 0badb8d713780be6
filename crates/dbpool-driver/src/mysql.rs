//! MySQL driver built on sqlx

use crate::Result;
use crate::config::{PoolShape, retire_pool};
use crate::connection::{Connection, Driver};
use crate::error::Error;
use futures::future::BoxFuture;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::{Connection as _, MySql, Pool};
use std::any::Any;
use std::str::FromStr;

/// Opens MySQL (and MySQL-compatible) servers from a `mysql://` DSN
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDriver;

impl Driver for MySqlDriver {
   fn open(&self, conn_str: &str) -> Result<Box<dyn Connection>> {
      // sqlx echoes the URL in some parse errors, which may contain a password
      let options = MySqlConnectOptions::from_str(conn_str)
         .map_err(|_| Error::InvalidConnectionString("malformed MySQL DSN".to_string()))?;

      Ok(Box::new(MySqlHandle {
         options,
         shape: PoolShape::default(),
         pool: None,
      }))
   }
}

/// Lazily connected MySQL handle
#[derive(Debug)]
pub struct MySqlHandle {
   options: MySqlConnectOptions,
   shape: PoolShape,
   pool: Option<MySqlPool>,
}

impl MySqlHandle {
   /// The live pool, for running queries through sqlx
   pub fn pool(&self) -> Result<&Pool<MySql>> {
      self.pool.as_ref().ok_or(Error::NotConnected)
   }

   fn connect_pool(&mut self) -> &MySqlPool {
      let shape = self.shape;
      let options = self.options.clone();

      self.pool.get_or_insert_with(|| {
         let mut pool_options = MySqlPoolOptions::new()
            .max_connections(shape.max_open)
            .min_connections(0);

         if shape.closes_on_release() {
            pool_options = pool_options.after_release(|_conn, _meta| Box::pin(async { Ok(false) }));
         }

         pool_options.connect_lazy_with(options)
      })
   }
}

impl Connection for MySqlHandle {
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
         let mut conn = self.connect_pool().acquire().await?;
         conn.ping().await?;
         Ok(())
      })
   }

   fn execute<'a>(&'a mut self, sql: &'a str) -> BoxFuture<'a, Result<()>> {
      Box::pin(async move {
         sqlx::query(sql).execute(self.connect_pool()).await?;
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

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_malformed_dsn_does_not_leak() {
      let err = MySqlDriver.open("hunter2@localhost/db").unwrap_err();
      assert!(matches!(err, Error::InvalidConnectionString(_)));
      assert!(!err.to_string().contains("hunter2"));
   }

   #[test]
   fn test_open_is_lazy() {
      // Nothing listens here; open must still succeed because it never connects
      let conn = MySqlDriver.open("mysql://root:pw@127.0.0.1:1/app").unwrap();
      assert_eq!(conn.pool_shape(), PoolShape::SINGLE);
   }
}
