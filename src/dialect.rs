//! Engine-specific SQL fragments, so callers can introspect a database
//! without branching on the engine themselves.

use crate::engine::Engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
   engine: Engine,
}

impl Dialect {
   pub fn new(engine: Engine) -> Self {
      Self { engine }
   }

   pub fn engine(&self) -> Engine {
      self.engine
   }

   /// Quote an identifier: backticks for MySQL, double quotes otherwise.
   /// Embedded quote characters are doubled.
   pub fn quote_ident(&self, name: &str) -> String {
      let quote = match self.engine {
         Engine::MySql => '`',
         Engine::DuckDb | Engine::Sqlite => '"',
      };

      let mut quoted = String::with_capacity(name.len() + 2);
      quoted.push(quote);
      for c in name.chars() {
         if c == quote {
            quoted.push(quote);
         }
         quoted.push(c);
      }
      quoted.push(quote);
      quoted
   }

   /// Query listing user tables, one name per row.
   pub fn list_tables_query(&self) -> &'static str {
      match self.engine {
         Engine::DuckDb => {
            "SELECT table_name FROM information_schema.tables WHERE table_schema = 'main'"
         }
         Engine::Sqlite => {
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'"
         }
         Engine::MySql => "SHOW TABLES",
      }
   }

   /// Query describing the columns of `table`.
   ///
   /// The DuckDB form takes the table name as its single `?` parameter; the
   /// others embed the quoted name.
   pub fn describe_columns_query(&self, table: &str) -> String {
      match self.engine {
         Engine::DuckDb => "SELECT column_name, data_type, \
             CASE WHEN is_nullable = 'YES' THEN 1 ELSE 0 END AS nullable \
             FROM information_schema.columns WHERE table_name = ? ORDER BY ordinal_position"
            .to_string(),
         Engine::Sqlite => format!("PRAGMA table_info({})", self.quote_ident(table)),
         Engine::MySql => format!("DESCRIBE {}", self.quote_ident(table)),
      }
   }

   /// Query listing index names, or `None` for MySQL where indexes can only
   /// be listed per table (`SHOW INDEX FROM <table>`).
   pub fn list_indexes_query(&self) -> Option<&'static str> {
      match self.engine {
         Engine::DuckDb => Some("SELECT index_name FROM duckdb_indexes()"),
         Engine::Sqlite => Some("SELECT name FROM sqlite_master WHERE type='index'"),
         Engine::MySql => None,
      }
   }

   /// Query returning column metadata for `table`, used for schema checks
   /// before appending data.
   pub fn table_info_query(&self, table: &str) -> String {
      match self.engine {
         Engine::DuckDb | Engine::Sqlite => format!("PRAGMA table_info({})", self.quote_ident(table)),
         Engine::MySql => format!("DESCRIBE {}", self.quote_ident(table)),
      }
   }
}

impl From<Engine> for Dialect {
   fn from(engine: Engine) -> Self {
      Self::new(engine)
   }
}
