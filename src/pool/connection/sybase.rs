use crate::config::ConnectionSettings;
use crate::error::DataAccessError;
use crate::sybase::SybaseConnection;

use super::DbConnection;

pub(super) async fn get_connection(
    settings: &ConnectionSettings,
) -> Result<DbConnection, DataAccessError> {
    Ok(DbConnection::Sybase(SybaseConnection::open(settings).await?))
}
