use dbpool_driver::{Database, DriverRegistry, Error, PoolShape, SqliteDriver, SqliteHandle};
use dbpool_driver::Driver;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn open(conn_str: &str) -> Database {
   Database::new("sqlite", SqliteDriver.open(conn_str).unwrap())
}

fn pool(db: &Database) -> &sqlx::SqlitePool {
   db.downcast_ref::<SqliteHandle>().unwrap().pool().unwrap()
}

#[tokio::test]
async fn test_wal_and_busy_timeout_applied() {
   let dir = TempDir::new().unwrap();
   let path = dir.path().join("wal.db");
   let mut db = open(&format!(
      "{}?_journal_mode=WAL&_busy_timeout=5000",
      path.display()
   ));

   db.ping().await.unwrap();
   assert!(path.exists(), "read-write open should create the file");

   let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
      .fetch_one(pool(&db))
      .await
      .unwrap();
   assert_eq!(mode.to_lowercase(), "wal");

   let (timeout,): (i64,) = sqlx::query_as("PRAGMA busy_timeout")
      .fetch_one(pool(&db))
      .await
      .unwrap();
   assert_eq!(timeout, 5000);

   db.close().await;
}

#[tokio::test]
async fn test_read_only_rejects_writes() {
   let dir = TempDir::new().unwrap();
   let path = dir.path().join("ro.db");

   let mut writer = open(&format!("{}?_journal_mode=WAL", path.display()));
   writer
      .execute("CREATE TABLE items (id INTEGER PRIMARY KEY)")
      .await
      .unwrap();
   writer.execute("INSERT INTO items (id) VALUES (1)").await.unwrap();
   writer.close().await;

   let mut reader = open(&format!("{}?_journal_mode=WAL&mode=ro", path.display()));
   reader.ping().await.unwrap();

   let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM items")
      .fetch_one(pool(&reader))
      .await
      .unwrap();
   assert_eq!(count, 1);

   let result = reader.execute("INSERT INTO items (id) VALUES (2)").await;
   assert!(result.is_err(), "read-only handle must not accept writes");

   reader.close().await;
}

#[tokio::test]
async fn test_read_only_missing_file_fails() {
   let dir = TempDir::new().unwrap();
   let path = dir.path().join("missing.db");
   let mut db = open(&format!("{}?mode=ro", path.display()));

   assert!(db.ping().await.is_err());
   assert!(!path.exists(), "read-only open must not create the file");
}

#[tokio::test]
async fn test_single_shape_keeps_no_idle_connections() {
   let dir = TempDir::new().unwrap();
   let path = dir.path().join("shape.db");
   let mut db = open(path.to_str().unwrap());
   db.set_pool_shape(PoolShape::SINGLE);
   db.ping().await.unwrap();

   let pool = pool(&db);
   assert_eq!(pool.options().get_max_connections(), 1);

   sqlx::query("SELECT 1").execute(pool).await.unwrap();

   // Release runs on a spawned task
   tokio::time::sleep(Duration::from_millis(200)).await;
   assert_eq!(pool.size(), 0, "released connections should be closed");
   assert_eq!(pool.num_idle(), 0);

   db.close().await;
}

#[tokio::test]
async fn test_pool_requires_ping() {
   let db = open(":memory:");
   let handle = db.downcast_ref::<SqliteHandle>().unwrap();
   assert!(matches!(handle.pool(), Err(Error::NotConnected)));
}

#[tokio::test]
async fn test_global_registry_resolves_once() {
   let registry = DriverRegistry::global();
   let first = registry.resolve_sqlite_driver().await;
   let second = DriverRegistry::global().resolve_sqlite_driver().await;

   assert_eq!(first.as_deref(), Some("sqlite"));
   assert_eq!(first, second);
   assert!(Arc::ptr_eq(&registry, &DriverRegistry::global()));
}

#[tokio::test]
async fn test_reshape_closes_live_pool() {
   let dir = TempDir::new().unwrap();
   let path = dir.path().join("reshape.db");
   let mut db = open(path.to_str().unwrap());
   db.ping().await.unwrap();

   let old = pool(&db).clone();
   db.set_pool_shape(PoolShape {
      max_idle: 1,
      max_open: 2,
   });

   tokio::time::sleep(Duration::from_millis(50)).await;
   assert!(old.is_closed(), "replaced pool should be closed");

   let handle = db.downcast_ref::<SqliteHandle>().unwrap();
   assert!(matches!(handle.pool(), Err(Error::NotConnected)));

   db.ping().await.unwrap();
   assert_eq!(pool(&db).options().get_max_connections(), 2);
   db.close().await;
}
