use std::sync::Arc;

use odbc_api::{Cursor, ResultSetMetadata};

use super::connection::{SybaseConnection, run_blocking};
use super::query::{build_result_set, convert_params};
use crate::error::DataAccessError;
use crate::results::ResultSet;
use crate::types::DbValue;

/// Execute a parameterless batch.
///
/// # Errors
/// Returns `DataAccessError::OdbcError` if the driver reports a failure.
pub async fn execute_batch(
    conn: &mut SybaseConnection,
    query: &str,
) -> Result<(), DataAccessError> {
    let sql = query.to_owned();
    run_blocking(Arc::clone(&conn.conn), move |odbc| {
        if let Some(cursor) = odbc.execute(&sql, (), None)? {
            drain(cursor)?;
        }
        Ok(())
    })
    .await
}

/// Execute a SELECT and return its first result.
///
/// # Errors
/// Returns `DataAccessError` if execution or result processing fails.
pub async fn execute_select(
    conn: &mut SybaseConnection,
    query: &str,
    params: &[DbValue],
) -> Result<ResultSet, DataAccessError> {
    let sets = execute_multiple(conn, query, params).await?;
    Ok(sets.into_iter().next().unwrap_or_default())
}

/// Execute a statement and collect every result that carries columns.
///
/// Row counts are suppressed for the batch, so a leading DML statement does
/// not hide the selects after it.
///
/// # Errors
/// Returns `DataAccessError` if execution or result processing fails.
pub async fn execute_multiple(
    conn: &mut SybaseConnection,
    query: &str,
    params: &[DbValue],
) -> Result<Vec<ResultSet>, DataAccessError> {
    let sql = without_row_counts(query);
    let values = params.to_vec();
    run_blocking(Arc::clone(&conn.conn), move |odbc| {
        let bound = convert_params(&values);
        let mut sets = Vec::new();
        let mut next = odbc.execute(&sql, bound.as_slice(), None)?;
        while let Some(mut cursor) = next {
            if returns_rows(cursor.num_result_cols()?) {
                sets.push(build_result_set(&mut cursor)?);
            }
            next = cursor.more_results()?;
        }
        Ok(sets)
    })
    .await
}

fn without_row_counts(query: &str) -> String {
    format!("SET NOCOUNT ON\n{}\nSET NOCOUNT OFF", query.trim_end())
}

fn returns_rows(num_cols: i16) -> bool {
    num_cols > 0
}

/// Execute a DML statement and return the number of affected rows.
///
/// # Errors
/// Returns `DataAccessError` if execution fails.
pub async fn execute_dml(
    conn: &mut SybaseConnection,
    query: &str,
    params: &[DbValue],
) -> Result<usize, DataAccessError> {
    let sql = query.to_owned();
    let values = params.to_vec();
    run_blocking(Arc::clone(&conn.conn), move |odbc| {
        let bound = convert_params(&values);
        let mut statement = odbc.preallocate()?;
        statement.execute(&sql, bound.as_slice())?;
        Ok(statement.row_count()?.unwrap_or(0))
    })
    .await
}

fn drain<C: Cursor>(cursor: C) -> Result<(), DataAccessError> {
    let mut next = Some(cursor);
    while let Some(current) = next {
        next = current.more_results()?;
    }
    Ok(())
}
