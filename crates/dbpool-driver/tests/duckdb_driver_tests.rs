#![cfg(feature = "duckdb")]

use dbpool_driver::{Database, Driver, DuckDbDriver, DuckDbHandle, Error, PoolShape};
use tempfile::TempDir;

fn open(conn_str: &str) -> Database {
   Database::new("duckdb", DuckDbDriver.open(conn_str).unwrap())
}

async fn count(db: &Database, sql: &'static str) -> i64 {
   db.downcast_ref::<DuckDbHandle>()
      .unwrap()
      .with_connection(move |conn| conn.query_row(sql, [], |row| row.get::<_, i64>(0)))
      .await
      .unwrap()
}

#[tokio::test]
async fn test_read_write_then_read_only() {
   let dir = TempDir::new().unwrap();
   let path = dir.path().join("sales.duckdb");
   let path_str = path.to_str().unwrap();

   let mut writer = open(path_str);
   writer.ping().await.unwrap();
   assert!(path.exists(), "read-write open should create the file");

   writer
      .execute("CREATE TABLE sales (id INTEGER, amount DOUBLE)")
      .await
      .unwrap();
   writer
      .execute("INSERT INTO sales VALUES (1, 9.5), (2, 3.25)")
      .await
      .unwrap();
   writer.execute("CHECKPOINT").await.unwrap();
   writer.close().await;

   let mut reader = open(&format!("{}?access_mode=read_only", path_str));
   reader.ping().await.unwrap();
   assert_eq!(count(&reader, "SELECT COUNT(*) FROM sales").await, 2);

   let result = reader.execute("INSERT INTO sales VALUES (3, 1.0)").await;
   assert!(result.is_err(), "read-only handle must not accept writes");

   reader.close().await;
}

#[tokio::test]
async fn test_read_only_missing_file_fails() {
   let dir = TempDir::new().unwrap();
   let path = dir.path().join("missing.duckdb");
   let mut db = open(&format!("{}?access_mode=read_only", path.display()));

   assert!(db.ping().await.is_err());
   assert!(!path.exists(), "read-only open must not create the file");
}

#[tokio::test]
async fn test_open_is_lazy() {
   let dir = TempDir::new().unwrap();
   let path = dir.path().join("lazy.duckdb");
   let db = open(path.to_str().unwrap());

   assert!(!path.exists());
   assert_eq!(db.pool_shape(), PoolShape::SINGLE);

   let handle = db.downcast_ref::<DuckDbHandle>().unwrap();
   let result = handle.with_connection(|conn| conn.execute_batch("SELECT 1")).await;
   assert!(matches!(result, Err(Error::NotConnected)));
}

#[tokio::test]
async fn test_in_memory() {
   let mut db = open(":memory:");
   db.execute("CREATE TABLE t AS SELECT * FROM range(5)").await.unwrap();
   assert_eq!(count(&db, "SELECT COUNT(*) FROM t").await, 5);
   db.close().await;
}
