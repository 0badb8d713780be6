use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Database engine a handle is opened against.
///
/// The serialized form is the stable engine identifier (`"duckdb"`, `"sqlite"`,
/// `"mysql"`), which is also the name of the driver the engine's opener looks
/// up in the [`DriverRegistry`](crate::DriverRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Engine {
   /// Embedded analytical engine (DuckDB)
   #[default]
   DuckDb,
   /// Embedded row-store engine (SQLite)
   Sqlite,
   /// Network relational engine (MySQL and compatibles)
   MySql,
}

impl Engine {
   pub const ALL: [Engine; 3] = [Engine::DuckDb, Engine::Sqlite, Engine::MySql];

   /// Stable identifier, also used as the driver name.
   pub fn as_str(&self) -> &'static str {
      match self {
         Engine::DuckDb => "duckdb",
         Engine::Sqlite => "sqlite",
         Engine::MySql => "mysql",
      }
   }

   /// Human-readable name used in log lines.
   pub fn label(&self) -> &'static str {
      match self {
         Engine::DuckDb => "DuckDB",
         Engine::Sqlite => "SQLite",
         Engine::MySql => "MySQL",
      }
   }
}

impl fmt::Display for Engine {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.as_str())
   }
}

impl FromStr for Engine {
   type Err = Error;

   fn from_str(s: &str) -> Result<Self, Self::Err> {
      Engine::ALL
         .into_iter()
         .find(|engine| engine.as_str() == s)
         .ok_or_else(|| Error::UnsupportedEngine(s.to_string()))
   }
}

impl TryFrom<String> for Engine {
   type Error = Error;

   fn try_from(value: String) -> Result<Self, Self::Error> {
      value.parse()
   }
}

impl From<Engine> for &'static str {
   fn from(engine: Engine) -> Self {
      engine.as_str()
   }
}

/// Read-write or read-only access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
   #[default]
   ReadWrite,
   ReadOnly,
}

impl AccessMode {
   pub fn is_read_only(&self) -> bool {
      matches!(self, AccessMode::ReadOnly)
   }
}
