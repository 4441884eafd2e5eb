use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bb8::{ManageConnection, Pool, PooledConnection};
use tokio::sync::Mutex;

use crate::config::ConnectionSettings;
use crate::error::DataAccessError;

/// Shared handle to one rusqlite connection; work on it runs on the blocking pool.
pub type SharedSqliteConnection = Arc<Mutex<rusqlite::Connection>>;

pub type SqlitePool = Pool<SqliteManager>;

pub type SqlitePooledConnection = PooledConnection<'static, SqliteManager>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// bb8 manager that opens rusqlite connections for a database path.
#[derive(Debug, Clone)]
pub struct SqliteManager {
    path: String,
}

impl SqliteManager {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl ManageConnection for SqliteManager {
    type Connection = SharedSqliteConnection;
    type Error = DataAccessError;

    #[allow(clippy::manual_async_fn)]
    fn connect(&self) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send {
        let path = self.path.clone();
        async move {
            let conn = tokio::task::spawn_blocking(move || {
                let conn = rusqlite::Connection::open(&path)?;
                conn.busy_timeout(BUSY_TIMEOUT)?;
                // journal_mode answers with a row, so it cannot go through execute_batch
                conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
                conn.execute_batch("PRAGMA foreign_keys = ON;")?;
                Ok::<_, DataAccessError>(conn)
            })
            .await
            .map_err(|e| {
                DataAccessError::ConnectionError(format!("sqlite open join error: {e}"))
            })??;
            Ok(Arc::new(Mutex::new(conn)))
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn is_valid(
        &self,
        conn: &mut Self::Connection,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        let handle = Arc::clone(conn);
        async move {
            run_blocking(handle, |guard| {
                guard.query_row("SELECT 1", [], |_| Ok(()))?;
                Ok(())
            })
            .await
        }
    }

    fn has_broken(&self, conn: &mut Self::Connection) -> bool {
        // never hand out a connection that is still inside a transaction
        conn.try_lock().is_ok_and(|guard| !guard.is_autocommit())
    }
}

/// Build the pool for a `SQLite` alias.
///
/// # Errors
/// Returns `DataAccessError::ConnectionError` if the first connection cannot be opened.
pub async fn build_pool(settings: &ConnectionSettings) -> Result<SqlitePool, DataAccessError> {
    Pool::builder()
        .max_size(settings.max_pool_size_or_default())
        .connection_timeout(settings.connect_timeout_or_default())
        .build(SqliteManager::new(settings.connection_string.clone()))
        .await
}

/// Run synchronous rusqlite work off the async runtime.
pub(crate) async fn run_blocking<F, R>(
    conn: SharedSqliteConnection,
    func: F,
) -> Result<R, DataAccessError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, DataAccessError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await
    .map_err(|e| DataAccessError::ExecutionError(format!("sqlite spawn_blocking join error: {e}")))?
}
