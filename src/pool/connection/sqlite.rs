use crate::error::DataAccessError;
use crate::sqlite::SqlitePool;

use super::DbConnection;

pub(super) async fn get_connection(pool: &SqlitePool) -> Result<DbConnection, DataAccessError> {
    let conn = pool.get_owned().await?;
    Ok(DbConnection::Sqlite(conn))
}

impl DbConnection {
    /// Run synchronous work against the raw rusqlite connection.
    ///
    /// Useful for pragmas or rusqlite features the executor does not expose. The
    /// closure runs on the blocking pool.
    ///
    /// # Errors
    /// Returns [`DataAccessError::Unimplemented`] when the connection is not `SQLite`.
    pub async fn with_blocking_sqlite<F, R>(&mut self, func: F) -> Result<R, DataAccessError>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<R, DataAccessError> + Send + 'static,
        R: Send + 'static,
    {
        match self {
            DbConnection::Sqlite(conn) => {
                crate::sqlite::config::run_blocking(std::sync::Arc::clone(&**conn), func).await
            }
            #[allow(unreachable_patterns)]
            _ => Err(DataAccessError::Unimplemented(
                "with_blocking_sqlite called on a non-sqlite connection".into(),
            )),
        }
    }
}
