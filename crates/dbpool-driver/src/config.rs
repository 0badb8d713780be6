//! Connection pool shape applied to every handle

use serde::{Deserialize, Serialize};
use sqlx::Pool;

/// Limits on how many connections a handle may hold open and idle
///
/// # Examples
///
/// ```
/// use dbpool_driver::PoolShape;
///
/// // What the connection manager applies to every handle it returns
/// let shape = PoolShape::SINGLE;
/// assert_eq!(shape.max_idle, 0);
/// assert_eq!(shape.max_open, 1);
///
/// // Defaults match SINGLE
/// assert_eq!(PoolShape::default(), PoolShape::SINGLE);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolShape {
   /// Maximum number of connections kept around after being released
   ///
   /// Zero means every connection is closed as soon as it is released, which
   /// drops any OS file lock the connection was holding.
   ///
   /// Default: 0
   pub max_idle: u32,

   /// Maximum number of simultaneously open connections
   ///
   /// Default: 1
   pub max_open: u32,
}

impl PoolShape {
   /// One connection, never kept idle
   pub const SINGLE: Self = Self {
      max_idle: 0,
      max_open: 1,
   };

   /// Whether released connections must be closed rather than pooled
   pub fn closes_on_release(&self) -> bool {
      self.max_idle == 0
   }
}

impl Default for PoolShape {
   fn default() -> Self {
      Self::SINGLE
   }
}

/// Close a pool that was replaced after a shape change
///
/// Closing waits for checked-out connections, so it runs on a spawned task.
/// Outside a runtime the pool is dropped, which closes its idle connections.
pub(crate) fn retire_pool<DB: sqlx::Database>(pool: Pool<DB>) {
   match tokio::runtime::Handle::try_current() {
      Ok(handle) => {
         handle.spawn(async move { pool.close().await });
      }
      Err(_) => drop(pool),
   }
}
