use super::config::MssqlClient;
use super::params::bind_query_params;
use super::query::build_result_sets;
use crate::error::DataAccessError;
use crate::results::ResultSet;
use crate::types::DbValue;

/// Execute a parameterless batch as a plain SQL batch.
///
/// Sent outside `sp_executesql`, so `BEGIN TRANSACTION` / `COMMIT` survive the call.
///
/// # Errors
/// Returns `DataAccessError::ExecutionError` if execution fails.
pub async fn execute_batch(client: &mut MssqlClient, query: &str) -> Result<(), DataAccessError> {
    let stream = client.simple_query(query).await.map_err(|e| {
        DataAccessError::ExecutionError(format!("SQL Server batch execution error: {e}"))
    })?;
    stream.into_results().await.map_err(|e| {
        DataAccessError::ExecutionError(format!("SQL Server batch execution error: {e}"))
    })?;
    Ok(())
}

/// Execute a SELECT and return its first result.
///
/// # Errors
/// Returns `DataAccessError` if execution or result processing fails.
pub async fn execute_select(
    client: &mut MssqlClient,
    query: &str,
    params: &[DbValue],
) -> Result<ResultSet, DataAccessError> {
    let sets = execute_multiple(client, query, params).await?;
    Ok(sets.into_iter().next().unwrap_or_default())
}

/// Execute a statement that may produce several results.
///
/// # Errors
/// Returns `DataAccessError` if execution or result processing fails.
pub async fn execute_multiple(
    client: &mut MssqlClient,
    query: &str,
    params: &[DbValue],
) -> Result<Vec<ResultSet>, DataAccessError> {
    let stream = bind_query_params(query, params)
        .query(client)
        .await
        .map_err(|e| DataAccessError::ExecutionError(format!("SQL Server query error: {e}")))?;
    build_result_sets(stream).await
}

/// Execute a DML statement and return the number of affected rows.
///
/// # Errors
/// Returns `DataAccessError::ExecutionError` if execution fails.
pub async fn execute_dml(
    client: &mut MssqlClient,
    query: &str,
    params: &[DbValue],
) -> Result<usize, DataAccessError> {
    let exec_result = bind_query_params(query, params)
        .execute(client)
        .await
        .map_err(|e| {
            DataAccessError::ExecutionError(format!("SQL Server DML execution error: {e}"))
        })?;

    let rows_affected: u64 = exec_result.rows_affected().iter().sum();
    usize::try_from(rows_affected)
        .map_err(|e| DataAccessError::ExecutionError(format!("Invalid rows affected count: {e}")))
}
