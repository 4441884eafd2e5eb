#[cfg(feature = "mssql")]
mod mssql;
#[cfg(feature = "sqlite")]
mod sqlite;
#[cfg(feature = "sybase")]
mod sybase;

#[cfg(feature = "mssql")]
use crate::mssql::MssqlPooledConnection;
#[cfg(feature = "sqlite")]
use crate::sqlite::SqlitePooledConnection;
#[cfg(feature = "sybase")]
use crate::sybase::SybaseConnection;

use super::types::ProviderPool;
use crate::error::DataAccessError;
use crate::types::{Provider, SqlDialect};

/// A live connection checked out for one alias.
///
/// Dropping it returns pooled connections to their pool and closes ODBC sessions.
pub enum DbConnection {
    #[cfg(feature = "mssql")]
    Mssql(MssqlPooledConnection),
    #[cfg(feature = "sqlite")]
    Sqlite(SqlitePooledConnection),
    #[cfg(feature = "sybase")]
    Sybase(SybaseConnection),
}

impl std::fmt::Debug for DbConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "mssql")]
            Self::Mssql(_) => f
                .debug_tuple("Mssql")
                .field(&"<TiberiusConnection>")
                .finish(),
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => f.debug_tuple("Sqlite").field(&"<SqliteConnection>").finish(),
            #[cfg(feature = "sybase")]
            Self::Sybase(conn) => f.debug_tuple("Sybase").field(conn).finish(),
        }
    }
}

impl ProviderPool {
    /// Check a connection out of the pool.
    ///
    /// # Errors
    /// Returns the pool's checkout error (timeout, connect failure).
    pub async fn get_connection(&self) -> Result<DbConnection, DataAccessError> {
        match self {
            #[cfg(feature = "mssql")]
            ProviderPool::Mssql(pool) => mssql::get_connection(pool).await,
            #[cfg(feature = "sqlite")]
            ProviderPool::Sqlite(pool) => sqlite::get_connection(pool).await,
            #[cfg(feature = "sybase")]
            ProviderPool::Sybase(settings) => sybase::get_connection(settings).await,
        }
    }
}

impl DbConnection {
    #[must_use]
    pub fn provider(&self) -> Provider {
        match self {
            #[cfg(feature = "mssql")]
            DbConnection::Mssql(_) => Provider::Mssql,
            #[cfg(feature = "sqlite")]
            DbConnection::Sqlite(_) => Provider::Sqlite,
            #[cfg(feature = "sybase")]
            DbConnection::Sybase(_) => Provider::Sybase,
        }
    }

    #[must_use]
    pub fn dialect(&self) -> SqlDialect {
        self.provider().dialect()
    }
}
