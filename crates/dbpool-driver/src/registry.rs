//! Named driver registry and SQLite driver resolution

use crate::Result;
use crate::config::PoolShape;
use crate::connection::{Database, Driver};
use crate::error::Error;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};
use tokio::sync::OnceCell;
use tracing::{debug, trace};

/// Driver names tried, in order, when looking for a working SQLite driver
pub const SQLITE_DRIVER_CANDIDATES: &[&str] = &["sqlite3", "sqlite"];

/// Process-wide registry, pre-populated with the drivers compiled into this crate
static GLOBAL_REGISTRY: LazyLock<Arc<DriverRegistry>> =
   LazyLock::new(|| Arc::new(DriverRegistry::with_builtin_drivers()));

/// Maps driver names to [`Driver`] implementations
///
/// Also memoises which SQLite driver name actually works, so the probe in
/// [`DriverRegistry::resolve_sqlite_driver`] runs at most once successfully
/// per registry.
pub struct DriverRegistry {
   drivers: RwLock<HashMap<String, Arc<dyn Driver>>>,
   sqlite_driver: OnceCell<String>,
}

impl DriverRegistry {
   /// An empty registry
   pub fn new() -> Self {
      Self {
         drivers: RwLock::new(HashMap::new()),
         sqlite_driver: OnceCell::new(),
      }
   }

   /// A registry holding every driver enabled by cargo features
   ///
   /// SQLite is always registered as `sqlite`. MySQL (`mysql` feature) and
   /// DuckDB (`duckdb` feature) are registered under their engine names.
   pub fn with_builtin_drivers() -> Self {
      let registry = Self::new();
      let mut drivers = registry.drivers.write();

      drivers.insert("sqlite".to_string(), Arc::new(crate::sqlite::SqliteDriver));

      #[cfg(feature = "mysql")]
      drivers.insert("mysql".to_string(), Arc::new(crate::mysql::MySqlDriver));

      #[cfg(feature = "duckdb")]
      drivers.insert("duckdb".to_string(), Arc::new(crate::duck::DuckDbDriver));

      drop(drivers);
      registry
   }

   /// The registry shared by the whole process
   pub fn global() -> Arc<DriverRegistry> {
      Arc::clone(&GLOBAL_REGISTRY)
   }

   /// Register `driver` under `name`
   ///
   /// Fails with [`Error::DuplicateDriver`] if the name is taken.
   pub fn register(&self, name: impl Into<String>, driver: Arc<dyn Driver>) -> Result<()> {
      let name = name.into();
      let mut drivers = self.drivers.write();

      if drivers.contains_key(&name) {
         return Err(Error::DuplicateDriver(name));
      }

      debug!("Registered database driver '{}'", name);
      drivers.insert(name, driver);
      Ok(())
   }

   pub fn get(&self, name: &str) -> Result<Arc<dyn Driver>> {
      self
         .drivers
         .read()
         .get(name)
         .cloned()
         .ok_or_else(|| Error::DriverNotRegistered(name.to_string()))
   }

   pub fn contains(&self, name: &str) -> bool {
      self.drivers.read().contains_key(name)
   }

   /// Names of all registered drivers, sorted
   pub fn driver_names(&self) -> Vec<String> {
      let mut names: Vec<String> = self.drivers.read().keys().cloned().collect();
      names.sort();
      names
   }

   /// Find the first SQLite driver name that can open and ping `:memory:`
   ///
   /// The winning name is cached; later calls return it without probing.
   /// Concurrent first calls are serialised, so only one probe sequence runs.
   /// When no candidate works nothing is cached and `None` is returned.
   pub async fn resolve_sqlite_driver(&self) -> Option<String> {
      self
         .sqlite_driver
         .get_or_try_init(|| async {
            for &name in SQLITE_DRIVER_CANDIDATES {
               match self.probe(name).await {
                  Ok(()) => {
                     debug!("Resolved SQLite driver '{}'", name);
                     return Ok(name.to_string());
                  }
                  Err(e) => trace!("SQLite driver candidate '{}' rejected: {}", name, e),
               }
            }
            Err(())
         })
         .await
         .ok()
         .cloned()
   }

   async fn probe(&self, name: &str) -> Result<()> {
      let driver = self.get(name)?;
      let mut db = Database::new(name, driver.open(":memory:")?);
      db.set_pool_shape(PoolShape::SINGLE);
      let result = db.ping().await;
      db.close().await;
      result
   }
}

impl Default for DriverRegistry {
   fn default() -> Self {
      Self::new()
   }
}

impl fmt::Debug for DriverRegistry {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("DriverRegistry")
         .field("drivers", &self.driver_names())
         .field("sqlite_driver", &self.sqlite_driver.get())
         .finish()
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_builtin_drivers_registered() {
      let registry = DriverRegistry::with_builtin_drivers();
      assert!(registry.contains("sqlite"));
      assert_eq!(registry.contains("mysql"), cfg!(feature = "mysql"));
      assert_eq!(registry.contains("duckdb"), cfg!(feature = "duckdb"));
   }

   #[test]
   fn test_duplicate_registration_rejected() {
      let registry = DriverRegistry::new();
      registry
         .register("sqlite", Arc::new(crate::sqlite::SqliteDriver))
         .unwrap();

      let err = registry
         .register("sqlite", Arc::new(crate::sqlite::SqliteDriver))
         .unwrap_err();
      assert!(matches!(err, Error::DuplicateDriver(name) if name == "sqlite"));
   }

   #[test]
   fn test_unknown_driver() {
      let registry = DriverRegistry::new();
      assert!(matches!(
         registry.get("nope"),
         Err(Error::DriverNotRegistered(name)) if name == "nope"
      ));
   }

   #[tokio::test]
   async fn test_resolve_skips_unregistered_candidates() {
      // Only "sqlite" is registered, so "sqlite3" must be skipped
      let registry = DriverRegistry::with_builtin_drivers();
      assert_eq!(registry.resolve_sqlite_driver().await.as_deref(), Some("sqlite"));
   }

   #[tokio::test]
   async fn test_resolve_empty_registry() {
      let registry = DriverRegistry::new();
      assert_eq!(registry.resolve_sqlite_driver().await, None);
      assert!(registry.sqlite_driver.get().is_none());
   }
}
