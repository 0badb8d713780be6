//! # dbpool-driver
//!
//! The driver layer underneath the `dbpool` connection manager: named drivers,
//! lazily connected handles and the pool shape every handle carries.
//!
//! ## Core Types
//!
//! - **[`Driver`]**: Turns a connection string into an unconnected [`Connection`]
//! - **[`Connection`]**: Driver-specific handle with pool shape, ping, execute and close
//! - **[`Database`]**: Owning wrapper returned to callers
//! - **[`DriverRegistry`]**: Drivers keyed by name, plus SQLite driver resolution
//! - **[`PoolShape`]**: Max open / max idle limits
//! - **[`Error`]**: Error type for driver operations
//!
//! ## Built-in drivers
//!
//! | Name     | Type             | Feature            |
//! |----------|------------------|--------------------|
//! | `sqlite` | [`SqliteDriver`] | always             |
//! | `mysql`  | `MySqlDriver`    | `mysql` (default)  |
//! | `duckdb` | `DuckDbDriver`   | `duckdb`           |
//!
//! ## Usage
//!
//! ```no_run
//! use dbpool_driver::{Database, DriverRegistry, PoolShape};
//!
//! #[tokio::main]
//! async fn main() -> dbpool_driver::Result<()> {
//!     let registry = DriverRegistry::global();
//!     let name = registry.resolve_sqlite_driver().await.expect("no SQLite driver");
//!
//!     // Opening is lazy; nothing touches the file until ping
//!     let mut db = Database::new(&name, registry.get(&name)?.open("example.db?mode=rwc")?);
//!     db.set_pool_shape(PoolShape::SINGLE);
//!     db.ping().await?;
//!
//!     db.execute("CREATE TABLE IF NOT EXISTS users (name TEXT)").await?;
//!     db.close().await;
//!     Ok(())
//! }
//! ```
//!
mod config;
mod connection;
mod error;
mod registry;
mod sqlite;

#[cfg(feature = "duckdb")]
mod duck;
#[cfg(feature = "mysql")]
mod mysql;

// Re-export public types
pub use config::PoolShape;
pub use connection::{Connection, Database, Driver};
pub use error::Error;
pub use registry::{DriverRegistry, SQLITE_DRIVER_CANDIDATES};
pub use sqlite::{SqliteDriver, SqliteHandle};

#[cfg(feature = "duckdb")]
pub use duck::{DuckDbDriver, DuckDbHandle};
#[cfg(feature = "mysql")]
pub use mysql::{MySqlDriver, MySqlHandle};

/// A type alias for Results with our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
