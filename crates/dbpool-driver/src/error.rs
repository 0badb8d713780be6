//! Error types for dbpool-driver

use thiserror::Error;

/// Errors that may occur while opening or using a driver connection
#[derive(Error, Debug)]
pub enum Error {
   /// IO error when accessing database files
   #[error("IO error: {0}")]
   Io(#[from] std::io::Error),

   /// Error from the sqlx library (SQLite and MySQL drivers)
   #[error("Sqlx error: {0}")]
   Sqlx(#[from] sqlx::Error),

   /// Error from the DuckDB engine
   #[cfg(feature = "duckdb")]
   #[error("DuckDB error: {0}")]
   DuckDb(#[from] duckdb::Error),

   /// The connection string could not be understood by the driver
   #[error("Invalid connection string: {0}")]
   InvalidConnectionString(String),

   /// No driver is registered under the requested name
   #[error("No driver registered under '{0}'")]
   DriverNotRegistered(String),

   /// A driver is already registered under this name
   #[error("A driver is already registered under '{0}'")]
   DuplicateDriver(String),

   /// The handle has not been pinged yet, so no pool exists
   #[error("Connection has not been established yet")]
   NotConnected,

   /// A blocking driver call panicked or was cancelled
   #[error("Blocking driver task failed: {0}")]
   Task(#[from] tokio::task::JoinError),

   /// Failure reported by a driver implemented outside this crate
   #[error("{0}")]
   Driver(String),
}
