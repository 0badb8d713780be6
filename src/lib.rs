//! # dbpool
//!
//! One entry point for opening DuckDB, SQLite and MySQL handles that hides
//! engine quirks: connection-string syntax, file-lock contention and DuckDB
//! write-ahead-log recovery.
//!
//! ## Core Types
//!
//! - **[`DbManager`]**: Holds the default engine and logger, dispatches to an opener
//! - **[`OpenOptions`]**: Engine, path or DSN, access mode and retry tuning for one call
//! - **[`Opener`]**: Per-engine "connect with retries" strategy
//! - **[`Database`]**: The handle returned to the caller (re-exported from `dbpool-driver`)
//! - **[`Dialect`]**: Engine-specific SQL fragments for introspection
//! - **[`Error`]**: Error type for open operations
//!
//! ## Open protocol
//!
//! - **Linear backoff**: attempt `i` is followed by a sleep of `base * (i + 1)`,
//!   8 attempts and a 400ms base unless overridden
//! - **Single connection**: every handle holds at most one connection and never
//!   keeps one idle, so file locks are released as soon as a query finishes
//! - **WAL recovery**: the first failed read-only DuckDB attempt of a call
//!   triggers one read-write `CHECKPOINT` of the same file
//! - **Cancellation**: [`DbManager::open_with_cancel`] races each backoff sleep
//!   against a `CancellationToken`
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use dbpool::{AccessMode, DbManager, Engine, Logger, OpenOptions};
//!
//! #[tokio::main]
//! async fn main() -> dbpool::Result<()> {
//!     let logger: Arc<dyn Logger> = Arc::new(|line: &str| eprintln!("{line}"));
//!     let manager = DbManager::new(Engine::Sqlite, Some(logger));
//!
//!     // Freshly created file: one attempt, no backoff
//!     let mut db = manager.open_new("import.db").await?;
//!     db.execute("CREATE TABLE rows (id INTEGER)").await?;
//!     db.close().await;
//!
//!     // Explicit options
//!     let reader = manager
//!         .open(OpenOptions {
//!             mode: AccessMode::ReadOnly,
//!             max_retries: 3,
//!             retry_base_ms: 100,
//!             ..OpenOptions::new("import.db")
//!         })
//!         .await?;
//!     reader.close().await;
//!     Ok(())
//! }
//! ```
//!
mod dialect;
mod engine;
mod error;
mod logger;
mod manager;
mod opener;
mod options;

pub use dialect::Dialect;
pub use engine::{AccessMode, Engine};
pub use error::{Error, Result};
pub use logger::{Logger, NoopLogger};
pub use manager::DbManager;
pub use opener::{
   DuckDbOpener, MySqlOpener, OpenContext, Opener, SqliteOpener, configure_pool,
   duckdb_connection_string, redact_dsn, sqlite_connection_string,
};
pub use options::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BASE_MS, OpenOptions, RetryPolicy};

// Re-export the driver layer so callers need only one dependency
pub use dbpool_driver::{Connection, Database, Driver, DriverRegistry, PoolShape};
pub use dbpool_driver::Error as DriverError;
pub use tokio_util::sync::CancellationToken;
