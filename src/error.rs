use crate::engine::Engine;

/// Result type alias for connection manager operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the connection manager.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Error from the driver layer outside the retry loop.
   #[error(transparent)]
   Driver(#[from] dbpool_driver::Error),

   /// Engine identifier with no opener behind it.
   #[error("unsupported engine {0:?}")]
   UnsupportedEngine(String),

   /// The engine's driver is missing from the registry.
   #[error("no driver registered under '{name}' for engine {engine}")]
   DriverNotRegistered { engine: Engine, name: String },

   /// None of the known SQLite driver names could open an in-memory database.
   #[error("no working SQLite driver registered")]
   NoSqliteDriver,

   /// Every attempt against a file-based engine failed.
   #[error("failed to open {engine} database '{path}' after {retries} retries: {source}")]
   OpenFailed {
      engine: Engine,
      path: String,
      retries: u32,
      #[source]
      source: dbpool_driver::Error,
   },

   /// Every attempt against the network engine failed. `dsn` has its
   /// password masked.
   #[error("failed to connect to {engine} server '{dsn}' after {retries} retries: {source}")]
   ServerUnreachable {
      engine: Engine,
      dsn: String,
      retries: u32,
      #[source]
      source: dbpool_driver::Error,
   },

   /// The caller's cancellation token fired while waiting to retry.
   #[error("opening {engine} database cancelled after {attempts} attempt(s)")]
   Cancelled { engine: Engine, attempts: u32 },
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// This provides machine-readable error codes for callers that map
   /// failures to their own error reporting.
   pub fn error_code(&self) -> String {
      match self {
         Error::Driver(_) => "DRIVER_ERROR".to_string(),
         Error::UnsupportedEngine(_) => "UNSUPPORTED_ENGINE".to_string(),
         Error::DriverNotRegistered { .. } => "DRIVER_NOT_REGISTERED".to_string(),
         Error::NoSqliteDriver => "NO_SQLITE_DRIVER".to_string(),
         Error::OpenFailed { .. } => "OPEN_FAILED".to_string(),
         Error::ServerUnreachable { .. } => "SERVER_UNREACHABLE".to_string(),
         Error::Cancelled { .. } => "CANCELLED".to_string(),
      }
   }

   /// Whether the failure came from exhausting retries rather than from
   /// configuration or cancellation.
   pub fn is_exhausted(&self) -> bool {
      matches!(
         self,
         Error::OpenFailed { .. } | Error::ServerUnreachable { .. }
      )
   }
}
