use bb8::{Pool, PooledConnection};
use bb8_tiberius::{ConnectionManager, rt};
use tiberius::Config as TiberiusConfig;

use crate::config::ConnectionSettings;
use crate::error::DataAccessError;

/// Type alias for SQL Server client
pub type MssqlClient = rt::Client;

pub type MssqlPool = Pool<ConnectionManager>;

pub type MssqlPooledConnection = PooledConnection<'static, ConnectionManager>;

/// Parse an ADO.NET style connection string
/// (`Server=tcp:host,1433;Database=db;User Id=u;Password=p;TrustServerCertificate=true`).
///
/// # Errors
/// Returns `DataAccessError::ConfigError` if the string cannot be parsed.
pub fn parse_connection_string(connection_string: &str) -> Result<TiberiusConfig, DataAccessError> {
    TiberiusConfig::from_ado_string(connection_string).map_err(|e| {
        DataAccessError::ConfigError(format!("invalid SQL Server connection string: {e}"))
    })
}

/// Build the pool for a SQL Server alias.
///
/// # Errors
/// Returns `DataAccessError::ConnectionError` if manager or pool creation fails.
pub async fn build_pool(settings: &ConnectionSettings) -> Result<MssqlPool, DataAccessError> {
    let config = parse_connection_string(&settings.connection_string)?;

    let manager = ConnectionManager::build(config).map_err(|e| {
        DataAccessError::ConnectionError(format!("Failed to configure SQL Server manager: {e}"))
    })?;

    Pool::builder()
        .max_size(settings.max_pool_size_or_default())
        .connection_timeout(settings.connect_timeout_or_default())
        .build(manager)
        .await
        .map_err(|e| {
            DataAccessError::ConnectionError(format!("Failed to create SQL Server pool: {e}"))
        })
}
