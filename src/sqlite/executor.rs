use std::sync::Arc;

use super::config::{SqlitePooledConnection, run_blocking};
use super::params::Params;
use super::query::build_result_set;
use crate::error::DataAccessError;
use crate::interpolate::split_statements;
use crate::results::ResultSet;
use crate::types::DbValue;

/// Execute a batch of SQL statements without parameters.
///
/// # Errors
/// Returns `DataAccessError::SqliteError` if any statement fails.
pub async fn execute_batch(
    conn: &mut SqlitePooledConnection,
    query: &str,
) -> Result<(), DataAccessError> {
    let sql = query.to_owned();
    run_blocking(Arc::clone(&**conn), move |guard| {
        guard.execute_batch(&sql)?;
        Ok(())
    })
    .await
}

/// Execute a SELECT and materialise the rows.
///
/// # Errors
/// Returns `DataAccessError` if preparation, binding or row extraction fails.
pub async fn execute_select(
    conn: &mut SqlitePooledConnection,
    query: &str,
    params: &[DbValue],
) -> Result<ResultSet, DataAccessError> {
    let sql = query.to_owned();
    let Params(values) = Params::convert(params);
    run_blocking(Arc::clone(&**conn), move |guard| {
        let mut stmt = guard.prepare(&sql)?;
        build_result_set(&mut stmt, &values)
    })
    .await
}

/// Execute a DML statement and return the number of affected rows.
///
/// # Errors
/// Returns `DataAccessError` if preparation, binding or execution fails.
pub async fn execute_dml(
    conn: &mut SqlitePooledConnection,
    query: &str,
    params: &[DbValue],
) -> Result<usize, DataAccessError> {
    let sql = query.to_owned();
    let Params(values) = Params::convert(params);
    run_blocking(Arc::clone(&**conn), move |guard| {
        let mut stmt = guard.prepare(&sql)?;
        Ok(stmt.execute(rusqlite::params_from_iter(values.iter()))?)
    })
    .await
}

/// Execute several `;`-separated statements and collect one result set per
/// statement that returns columns.
///
/// Placeholders are numbered across the whole batch (`?1`, `?2`, ...), so each
/// statement binds the leading slice of `params` it refers to.
///
/// # Errors
/// Returns `DataAccessError` if any statement fails or refers to a missing parameter.
pub async fn execute_multiple(
    conn: &mut SqlitePooledConnection,
    query: &str,
    params: &[DbValue],
) -> Result<Vec<ResultSet>, DataAccessError> {
    let statements: Vec<String> = split_statements(query)
        .into_iter()
        .map(str::to_owned)
        .collect();
    let Params(values) = Params::convert(params);
    run_blocking(Arc::clone(&**conn), move |guard| {
        let mut sets = Vec::new();
        for sql in &statements {
            let mut stmt = guard.prepare(sql)?;
            let wanted = stmt.parameter_count();
            if wanted > values.len() {
                return Err(DataAccessError::ParameterError(format!(
                    "statement needs {wanted} parameters but {} were supplied",
                    values.len()
                )));
            }
            if stmt.column_count() > 0 {
                sets.push(build_result_set(&mut stmt, &values[..wanted])?);
            } else {
                stmt.execute(rusqlite::params_from_iter(values[..wanted].iter()))?;
            }
        }
        Ok(sets)
    })
    .await
}
