use thiserror::Error;

#[cfg(feature = "mssql")]
use bb8_tiberius::Error as Bb8TiberiusError;

#[derive(Debug, Error)]
pub enum DataAccessError {
    #[cfg(feature = "mssql")]
    #[error(transparent)]
    MssqlError(#[from] tiberius::error::Error),

    #[cfg(feature = "mssql")]
    #[error(transparent)]
    PoolErrorMssql(#[from] bb8::RunError<Bb8TiberiusError>),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "sybase")]
    #[error(transparent)]
    OdbcError(#[from] odbc_api::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("No connection configured for alias '{0}'")]
    UnknownAlias(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Mapping error: {0}")]
    MappingError(String),

    #[error("Validation failed for column '{column}': {reason}")]
    ValidationError { column: String, reason: String },

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),
}

#[cfg(feature = "sqlite")]
impl From<bb8::RunError<DataAccessError>> for DataAccessError {
    fn from(err: bb8::RunError<DataAccessError>) -> Self {
        match err {
            bb8::RunError::User(inner) => inner,
            bb8::RunError::TimedOut => {
                DataAccessError::ConnectionError("SQLite pool checkout timed out".into())
            }
        }
    }
}
