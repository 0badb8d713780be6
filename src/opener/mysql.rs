use dbpool_driver::Database;
use futures::future::BoxFuture;

use super::{OpenContext, Opener, connect};
use crate::engine::Engine;
use crate::options::OpenOptions;
use crate::{Error, Result};

/// Connects to a MySQL server, passing `path` through verbatim as the DSN.
///
/// Retries here cover a server that is still starting up or briefly refusing
/// connections, not file locks.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlOpener;

impl Opener for MySqlOpener {
   fn open<'a>(
      &'a self,
      ctx: &'a OpenContext<'a>,
      opts: &'a OpenOptions,
   ) -> BoxFuture<'a, Result<Database>> {
      Box::pin(open_mysql(ctx, opts))
   }
}

/// Mask the password in `user:password@host` style DSNs, with or without a
/// `scheme://` prefix.
pub fn redact_dsn(dsn: &str) -> String {
   let start = dsn.find("://").map_or(0, |i| i + 3);
   let rest = &dsn[start..];

   let Some(at) = rest.rfind('@') else {
      return dsn.to_string();
   };
   let Some(colon) = rest[..at].find(':') else {
      return dsn.to_string();
   };

   format!("{}{}:***{}", &dsn[..start], &rest[..colon], &rest[at..])
}

async fn open_mysql(ctx: &OpenContext<'_>, opts: &OpenOptions) -> Result<Database> {
   let engine = Engine::MySql;
   let driver = ctx.driver(engine)?;
   let policy = opts.retry_policy();
   let mut attempt = 0;

   loop {
      let err = match connect(driver.as_ref(), engine.as_str(), &opts.path).await {
         Ok(db) => return Ok(db),
         Err(e) => e,
      };

      ctx.warn(&format!(
         "{} attempt {}/{} failed: {}",
         engine.label(),
         attempt + 1,
         policy.max_retries,
         err
      ));

      if !policy.has_next(attempt) {
         return Err(Error::ServerUnreachable {
            engine,
            dsn: redact_dsn(&opts.path),
            retries: policy.max_retries,
            source: err,
         });
      }

      ctx.backoff(engine, &policy, attempt).await?;
      attempt += 1;
   }
}
