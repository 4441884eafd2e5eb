#[cfg(feature = "mssql")]
use crate::mssql::MssqlPool;
#[cfg(feature = "sqlite")]
use crate::sqlite::SqlitePool;

use crate::config::ConnectionSettings;
use crate::error::DataAccessError;
use crate::types::Provider;

/// Connection source for one alias.
///
/// SQL Server and `SQLite` hold a bb8 pool; Sybase keeps its settings and opens an
/// ODBC session per checkout.
#[derive(Clone)]
pub enum ProviderPool {
    /// SQL Server connection pool
    #[cfg(feature = "mssql")]
    Mssql(MssqlPool),
    /// `SQLite` connection pool
    #[cfg(feature = "sqlite")]
    Sqlite(SqlitePool),
    /// Sybase ASE session settings
    #[cfg(feature = "sybase")]
    Sybase(ConnectionSettings),
}

// bb8_tiberius::ConnectionManager doesn't implement Debug
impl std::fmt::Debug for ProviderPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "mssql")]
            Self::Mssql(_) => f.debug_tuple("Mssql").field(&"<TiberiusPool>").finish(),
            #[cfg(feature = "sqlite")]
            Self::Sqlite(pool) => f.debug_tuple("Sqlite").field(&pool.state()).finish(),
            #[cfg(feature = "sybase")]
            Self::Sybase(_) => f.debug_tuple("Sybase").field(&"<OdbcSettings>").finish(),
        }
    }
}

impl ProviderPool {
    /// Create the connection source for `settings.provider`.
    ///
    /// # Errors
    /// Returns `DataAccessError::Unimplemented` if the provider was not compiled in,
    /// or the backend's pool creation error.
    pub async fn build(settings: &ConnectionSettings) -> Result<Self, DataAccessError> {
        match settings.provider {
            #[cfg(feature = "mssql")]
            Provider::Mssql => Ok(ProviderPool::Mssql(crate::mssql::build_pool(settings).await?)),
            #[cfg(feature = "sqlite")]
            Provider::Sqlite => Ok(ProviderPool::Sqlite(
                crate::sqlite::config::build_pool(settings).await?,
            )),
            #[cfg(feature = "sybase")]
            Provider::Sybase => Ok(ProviderPool::Sybase(settings.clone())),
            #[allow(unreachable_patterns)]
            other => Err(DataAccessError::Unimplemented(format!(
                "provider '{other}' is not enabled in the current build"
            ))),
        }
    }

    #[must_use]
    pub fn provider(&self) -> Provider {
        match self {
            #[cfg(feature = "mssql")]
            ProviderPool::Mssql(_) => Provider::Mssql,
            #[cfg(feature = "sqlite")]
            ProviderPool::Sqlite(_) => Provider::Sqlite,
            #[cfg(feature = "sybase")]
            ProviderPool::Sybase(_) => Provider::Sybase,
        }
    }
}
