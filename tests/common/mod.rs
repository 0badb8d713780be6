#![allow(dead_code)]

use dbpool::{
   Connection, DbManager, Driver, DriverError, DriverRegistry, Engine, Logger, PoolShape,
};
use futures::future::BoxFuture;
use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// What a [`ScriptedDriver`] has seen, shared with the test
#[derive(Debug, Default)]
pub struct DriverState {
   /// Pings of non-memory handles that still have to fail
   pub failures_left: AtomicU32,
   pub fail_forever: AtomicBool,
   pub fail_execute: AtomicBool,
   /// Refuse to open `:memory:`, which makes resolver probes fail
   pub refuse_memory: AtomicBool,
   pub opened: Mutex<Vec<String>>,
   pub executed: Mutex<Vec<String>>,
   /// Pings of file/DSN handles, i.e. open attempts
   pub attempts: AtomicU32,
   /// Pings of `:memory:` handles, i.e. resolver probes
   pub probes: AtomicU32,
   pub closed: AtomicU32,
}

impl DriverState {
   pub fn attempts(&self) -> u32 {
      self.attempts.load(Ordering::SeqCst)
   }

   pub fn probes(&self) -> u32 {
      self.probes.load(Ordering::SeqCst)
   }

   pub fn opened(&self) -> Vec<String> {
      self.opened.lock().unwrap().clone()
   }

   pub fn executed(&self) -> Vec<String> {
      self.executed.lock().unwrap().clone()
   }
}

/// In-memory driver whose pings fail according to a script
#[derive(Clone)]
pub struct ScriptedDriver {
   pub state: Arc<DriverState>,
}

impl ScriptedDriver {
   pub fn healthy() -> Self {
      Self {
         state: Arc::new(DriverState::default()),
      }
   }

   /// Fails the first `n` attempts, then succeeds
   pub fn failing(n: u32) -> Self {
      let driver = Self::healthy();
      driver.state.failures_left.store(n, Ordering::SeqCst);
      driver
   }

   pub fn always_failing() -> Self {
      let driver = Self::healthy();
      driver.state.fail_forever.store(true, Ordering::SeqCst);
      driver
   }
}

impl Driver for ScriptedDriver {
   fn open(&self, conn_str: &str) -> Result<Box<dyn Connection>, DriverError> {
      let memory = conn_str == ":memory:";
      if memory && self.state.refuse_memory.load(Ordering::SeqCst) {
         return Err(DriverError::Driver(
            "in-memory databases not supported".to_string(),
         ));
      }

      self.state.opened.lock().unwrap().push(conn_str.to_string());
      Ok(Box::new(ScriptedConnection {
         state: Arc::clone(&self.state),
         memory,
         shape: PoolShape {
            max_idle: 2,
            max_open: 0,
         },
      }))
   }
}

#[derive(Debug)]
struct ScriptedConnection {
   state: Arc<DriverState>,
   memory: bool,
   shape: PoolShape,
}

impl Connection for ScriptedConnection {
   fn set_pool_shape(&mut self, shape: PoolShape) {
      self.shape = shape;
   }

   fn pool_shape(&self) -> PoolShape {
      self.shape
   }

   fn ping(&mut self) -> BoxFuture<'_, Result<(), DriverError>> {
      Box::pin(async move {
         if self.memory {
            self.state.probes.fetch_add(1, Ordering::SeqCst);
            return Ok(());
         }

         self.state.attempts.fetch_add(1, Ordering::SeqCst);

         let scripted_failure = self
            .state
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

         if scripted_failure || self.state.fail_forever.load(Ordering::SeqCst) {
            return Err(DriverError::Driver(
               "database is locked".to_string(),
            ));
         }
         Ok(())
      })
   }

   fn execute<'a>(&'a mut self, sql: &'a str) -> BoxFuture<'a, Result<(), DriverError>> {
      Box::pin(async move {
         self.state.executed.lock().unwrap().push(sql.to_string());
         if self.state.fail_execute.load(Ordering::SeqCst) {
            return Err(DriverError::Driver(
               "checkpoint needs an exclusive lock".to_string(),
            ));
         }
         Ok(())
      })
   }

   fn close(self: Box<Self>) -> BoxFuture<'static, ()> {
      Box::pin(async move {
         self.state.closed.fetch_add(1, Ordering::SeqCst);
      })
   }

   fn as_any(&self) -> &dyn Any {
      self
   }
}

/// Logger collecting every line it receives
pub fn capture_logger() -> (Arc<dyn Logger>, Arc<Mutex<Vec<String>>>) {
   let lines = Arc::new(Mutex::new(Vec::new()));
   let sink = Arc::clone(&lines);
   let logger: Arc<dyn Logger> = Arc::new(move |line: &str| {
      sink.lock().unwrap().push(line.to_string());
   });
   (logger, lines)
}

/// Manager over a private registry holding `driver` under `name`
pub fn manager_with(
   default_engine: Engine,
   name: &str,
   driver: &ScriptedDriver,
) -> (DbManager, Arc<Mutex<Vec<String>>>) {
   let registry = Arc::new(DriverRegistry::new());
   registry.register(name, Arc::new(driver.clone())).unwrap();

   let (logger, lines) = capture_logger();
   let manager = DbManager::new(default_engine, Some(logger)).with_registry(registry);
   (manager, lines)
}

pub fn lines(lines: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
   lines.lock().unwrap().clone()
}
