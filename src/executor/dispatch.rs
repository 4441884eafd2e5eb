use async_trait::async_trait;
use tracing::debug;

use super::SqlExecutor;
use crate::error::DataAccessError;
use crate::pool::DbConnection;
use crate::results::ResultSet;
use crate::types::{DbValue, Provider};

#[cfg(feature = "mssql")]
use crate::mssql;
#[cfg(feature = "sqlite")]
use crate::sqlite;
#[cfg(feature = "sybase")]
use crate::sybase;

#[async_trait]
impl SqlExecutor for DbConnection {
    fn provider(&self) -> Provider {
        DbConnection::provider(self)
    }

    async fn execute_batch(&mut self, sql: &str) -> Result<(), DataAccessError> {
        debug!(provider = %DbConnection::provider(self), sql, "execute_batch");
        match self {
            #[cfg(feature = "mssql")]
            DbConnection::Mssql(conn) => mssql::execute_batch(conn, sql).await,
            #[cfg(feature = "sqlite")]
            DbConnection::Sqlite(conn) => sqlite::execute_batch(conn, sql).await,
            #[cfg(feature = "sybase")]
            DbConnection::Sybase(conn) => sybase::execute_batch(conn, sql).await,
        }
    }

    async fn execute_select(
        &mut self,
        sql: &str,
        params: &[DbValue],
    ) -> Result<ResultSet, DataAccessError> {
        debug!(
            provider = %DbConnection::provider(self),
            sql,
            params = params.len(),
            "execute_select"
        );
        match self {
            #[cfg(feature = "mssql")]
            DbConnection::Mssql(conn) => mssql::execute_select(conn, sql, params).await,
            #[cfg(feature = "sqlite")]
            DbConnection::Sqlite(conn) => sqlite::execute_select(conn, sql, params).await,
            #[cfg(feature = "sybase")]
            DbConnection::Sybase(conn) => sybase::execute_select(conn, sql, params).await,
        }
    }

    async fn execute_dml(
        &mut self,
        sql: &str,
        params: &[DbValue],
    ) -> Result<usize, DataAccessError> {
        debug!(
            provider = %DbConnection::provider(self),
            sql,
            params = params.len(),
            "execute_dml"
        );
        match self {
            #[cfg(feature = "mssql")]
            DbConnection::Mssql(conn) => mssql::execute_dml(conn, sql, params).await,
            #[cfg(feature = "sqlite")]
            DbConnection::Sqlite(conn) => sqlite::execute_dml(conn, sql, params).await,
            #[cfg(feature = "sybase")]
            DbConnection::Sybase(conn) => sybase::execute_dml(conn, sql, params).await,
        }
    }

    async fn execute_multiple(
        &mut self,
        sql: &str,
        params: &[DbValue],
    ) -> Result<Vec<ResultSet>, DataAccessError> {
        debug!(
            provider = %DbConnection::provider(self),
            sql,
            params = params.len(),
            "execute_multiple"
        );
        match self {
            #[cfg(feature = "mssql")]
            DbConnection::Mssql(conn) => mssql::execute_multiple(conn, sql, params).await,
            #[cfg(feature = "sqlite")]
            DbConnection::Sqlite(conn) => sqlite::execute_multiple(conn, sql, params).await,
            #[cfg(feature = "sybase")]
            DbConnection::Sybase(conn) => sybase::execute_multiple(conn, sql, params).await,
        }
    }
}
