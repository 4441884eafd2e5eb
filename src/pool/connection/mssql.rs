use crate::error::DataAccessError;
use crate::mssql::MssqlPool;

use super::DbConnection;

pub(super) async fn get_connection(pool: &MssqlPool) -> Result<DbConnection, DataAccessError> {
    let conn = pool
        .get_owned()
        .await
        .map_err(DataAccessError::PoolErrorMssql)?;
    Ok(DbConnection::Mssql(conn))
}
