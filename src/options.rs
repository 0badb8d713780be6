//! Per-call open options and the retry policy derived from them

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::{AccessMode, Engine};

/// Retry count used when [`OpenOptions::max_retries`] is 0.
pub const DEFAULT_MAX_RETRIES: u32 = 8;

/// Backoff base used when [`OpenOptions::retry_base_ms`] is 0.
pub const DEFAULT_RETRY_BASE_MS: u64 = 400;

/// How a single `open` call should connect.
///
/// `path` is a filesystem path for DuckDB and SQLite and an opaque DSN for
/// MySQL. It is handed to the driver as-is.
///
/// # Examples
///
/// ```
/// use dbpool::{AccessMode, Engine, OpenOptions};
///
/// let opts = OpenOptions {
///    engine: Some(Engine::Sqlite),
///    mode: AccessMode::ReadOnly,
///    ..OpenOptions::new("analytics.db")
/// };
/// assert_eq!(opts.retry_policy().max_retries, 8);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenOptions {
   /// Engine to use; `None` means the manager's default engine
   pub engine: Option<Engine>,
   pub path: String,
   pub mode: AccessMode,
   /// Number of attempts; 0 means [`DEFAULT_MAX_RETRIES`]
   pub max_retries: u32,
   /// Backoff base in milliseconds; 0 means [`DEFAULT_RETRY_BASE_MS`]
   pub retry_base_ms: u64,
}

impl OpenOptions {
   /// Read-write options for `path` with default engine and retry settings.
   pub fn new(path: impl Into<String>) -> Self {
      Self {
         path: path.into(),
         ..Default::default()
      }
   }

   pub fn retry_policy(&self) -> RetryPolicy {
      RetryPolicy::from_options(self)
   }
}

/// Linear backoff: attempt `i` (0-indexed) is followed by a sleep of `base * (i + 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
   pub max_retries: u32,
   pub base: Duration,
}

impl RetryPolicy {
   pub fn from_options(opts: &OpenOptions) -> Self {
      let max_retries = match opts.max_retries {
         0 => DEFAULT_MAX_RETRIES,
         n => n,
      };
      let base_ms = match opts.retry_base_ms {
         0 => DEFAULT_RETRY_BASE_MS,
         ms => ms,
      };

      Self {
         max_retries,
         base: Duration::from_millis(base_ms),
      }
   }

   /// Sleep that follows failed attempt `attempt` (0-indexed).
   pub fn delay(&self, attempt: u32) -> Duration {
      self.base.saturating_mul(attempt.saturating_add(1))
   }

   /// Whether a failed `attempt` is followed by another one.
   pub fn has_next(&self, attempt: u32) -> bool {
      attempt + 1 < self.max_retries
   }

   /// Upper bound on total time spent sleeping when every attempt fails.
   pub fn worst_case_wait(&self) -> Duration {
      (0..self.max_retries.saturating_sub(1))
         .map(|attempt| self.delay(attempt))
         .sum()
   }
}

impl Default for RetryPolicy {
   fn default() -> Self {
      Self::from_options(&OpenOptions::default())
   }
}
