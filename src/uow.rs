//! Transactional scope over one checked-out connection.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::DataAccessError;
use crate::executor::SqlExecutor;
use crate::pool::DbConnection;
use crate::results::ResultSet;
use crate::types::{DbValue, Provider};

/// One connection plus one open transaction.
///
/// `commit` and `rollback` consume the unit and hand the connection back. A unit
/// dropped while still open rolls back on the current Tokio runtime before the
/// connection returns to its pool; with no runtime available the connection is
/// closed and the server discards the transaction.
#[derive(Debug)]
pub struct UnitOfWork {
    conn: Option<DbConnection>,
    provider: Provider,
}

impl UnitOfWork {
    /// Start a transaction on `conn`.
    ///
    /// # Errors
    /// Returns the error from the `BEGIN` statement.
    pub async fn begin(mut conn: DbConnection) -> Result<Self, DataAccessError> {
        let provider = conn.provider();
        conn.execute_batch(provider.dialect().begin_statement())
            .await?;
        debug!(%provider, "unit of work started");
        Ok(Self {
            conn: Some(conn),
            provider,
        })
    }

    fn conn_mut(&mut self) -> Result<&mut DbConnection, DataAccessError> {
        self.conn.as_mut().ok_or_else(|| {
            DataAccessError::ExecutionError("unit of work is already finished".into())
        })
    }

    /// Commit and return the connection.
    ///
    /// If the commit fails the transaction is still rolled back when the unit
    /// goes out of scope.
    ///
    /// # Errors
    /// Returns the error from the `COMMIT` statement.
    pub async fn commit(mut self) -> Result<DbConnection, DataAccessError> {
        let statement = self.provider.dialect().commit_statement();
        self.conn_mut()?.execute_batch(statement).await?;
        debug!(provider = %self.provider, "unit of work committed");
        self.conn.take().ok_or_else(|| {
            DataAccessError::ExecutionError("unit of work is already finished".into())
        })
    }

    /// Roll back and return the connection.
    ///
    /// # Errors
    /// Returns the error from the `ROLLBACK` statement.
    pub async fn rollback(mut self) -> Result<DbConnection, DataAccessError> {
        let mut conn = self.conn.take().ok_or_else(|| {
            DataAccessError::ExecutionError("unit of work is already finished".into())
        })?;
        conn.execute_batch(self.provider.dialect().rollback_statement())
            .await?;
        debug!(provider = %self.provider, "unit of work rolled back");
        Ok(conn)
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }
}

#[async_trait]
impl SqlExecutor for UnitOfWork {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn execute_batch(&mut self, sql: &str) -> Result<(), DataAccessError> {
        self.conn_mut()?.execute_batch(sql).await
    }

    async fn execute_select(
        &mut self,
        sql: &str,
        params: &[DbValue],
    ) -> Result<ResultSet, DataAccessError> {
        self.conn_mut()?.execute_select(sql, params).await
    }

    async fn execute_dml(
        &mut self,
        sql: &str,
        params: &[DbValue],
    ) -> Result<usize, DataAccessError> {
        self.conn_mut()?.execute_dml(sql, params).await
    }

    async fn execute_multiple(
        &mut self,
        sql: &str,
        params: &[DbValue],
    ) -> Result<Vec<ResultSet>, DataAccessError> {
        self.conn_mut()?.execute_multiple(sql, params).await
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        let Some(mut conn) = self.conn.take() else {
            return;
        };
        let provider = self.provider;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!(%provider, "unit of work dropped while open; rolling back");
                handle.spawn(async move {
                    let statement = provider.dialect().rollback_statement();
                    if let Err(e) = conn.execute_batch(statement).await {
                        warn!(%provider, error = %e, "implicit rollback failed");
                    }
                });
            }
            Err(_) => {
                warn!(%provider, "unit of work dropped outside a runtime; closing connection");
            }
        }
    }
}
