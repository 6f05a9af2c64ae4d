//! Lazily-established, shared database handle.
//!
//! `LazyDatabase` defers connecting until the first repository call. Callers
//! that arrive while the first attempt is in flight await that same attempt
//! (single-flight). A failed attempt is reported to every waiter and then
//! forgotten, so the next call starts a fresh connection attempt. A
//! successful attempt is memoized for the life of the handle.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::{self, BoxFuture, FutureExt, Shared};
use postpilot_types::error::RepositoryError;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::pool::DatabasePool;

type ConnectAttempt = Shared<BoxFuture<'static, Result<DatabasePool, Arc<sqlx::Error>>>>;

type Connector =
    Arc<dyn Fn() -> BoxFuture<'static, Result<DatabasePool, sqlx::Error>> + Send + Sync>;

/// Cheaply cloneable handle to a database that connects on first use.
#[derive(Clone)]
pub struct LazyDatabase {
    inner: Arc<Inner>,
}

struct Inner {
    connector: Connector,
    attempt: Mutex<Option<ConnectAttempt>>,
}

impl LazyDatabase {
    /// Handle that opens (and migrates) `database_url` on first use.
    pub fn new(database_url: impl Into<String>) -> Self {
        let url: Arc<str> = Arc::from(database_url.into());
        Self::with_connector(move || {
            let url = Arc::clone(&url);
            async move { DatabasePool::new(&url).await }
        })
    }

    /// Handle that calls `connect` to establish the pool.
    pub fn with_connector<F, Fut>(connect: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<DatabasePool, sqlx::Error>> + Send + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                connector: Arc::new(move || connect().boxed()),
                attempt: Mutex::new(None),
            }),
        }
    }

    /// Handle around an already-open pool.
    pub fn ready(pool: DatabasePool) -> Self {
        let settled: ConnectAttempt = future::ready(Ok(pool)).boxed().shared();
        Self {
            inner: Arc::new(Inner {
                connector: Arc::new(|| {
                    future::ready(Err(sqlx::Error::Configuration(
                        "pre-connected handle cannot reconnect".into(),
                    )))
                    .boxed()
                }),
                attempt: Mutex::new(Some(settled)),
            }),
        }
    }

    /// Return the connected pool, connecting first if needed.
    pub async fn get(&self) -> Result<DatabasePool, RepositoryError> {
        let attempt = {
            let mut slot = self.inner.attempt.lock().await;
            match slot.as_ref() {
                Some(attempt) => attempt.clone(),
                None => {
                    debug!("Connecting to database");
                    let attempt = (self.inner.connector)()
                        .map(|result| {
                            if result.is_ok() {
                                info!("Database connected");
                            }
                            result.map_err(Arc::new)
                        })
                        .boxed()
                        .shared();
                    *slot = Some(attempt.clone());
                    attempt
                }
            }
        };

        match attempt.clone().await {
            Ok(pool) => Ok(pool),
            Err(err) => {
                let mut slot = self.inner.attempt.lock().await;
                if slot.as_ref().is_some_and(|current| current.ptr_eq(&attempt)) {
                    *slot = None;
                    warn!(error = %err, "Database connection failed; next call will retry");
                }
                Err(RepositoryError::Connection(err.to_string()))
            }
        }
    }
}
