use super::SqlExecutor;
use crate::error::DataAccessError;
use crate::interpolate::build_interpolated_sql;
use crate::results::{FromDbValue, FromRow, ResultSet};
use crate::types::DbValue;

/// Run a query and decode every row.
///
/// # Errors
/// Returns the execution error, or `DataAccessError::MappingError` if a row does not decode.
pub async fn query<T, E>(
    exec: &mut E,
    sql: &str,
    params: &[DbValue],
) -> Result<Vec<T>, DataAccessError>
where
    T: FromRow,
    E: SqlExecutor + ?Sized,
{
    let result_set = exec.execute_select(sql, params).await?;
    result_set.iter().map(T::from_row).collect()
}

/// First row of a query, or `None` when it returns nothing.
///
/// # Errors
/// Returns the execution or mapping error.
pub async fn query_first<T, E>(
    exec: &mut E,
    sql: &str,
    params: &[DbValue],
) -> Result<Option<T>, DataAccessError>
where
    T: FromRow,
    E: SqlExecutor + ?Sized,
{
    let result_set = exec.execute_select(sql, params).await?;
    result_set.first().map(T::from_row).transpose()
}

/// The only row of a query.
///
/// # Errors
/// Returns `DataAccessError::MappingError` unless exactly one row comes back.
pub async fn query_single<T, E>(
    exec: &mut E,
    sql: &str,
    params: &[DbValue],
) -> Result<T, DataAccessError>
where
    T: FromRow,
    E: SqlExecutor + ?Sized,
{
    let result_set = exec.execute_select(sql, params).await?;
    match result_set.results.as_slice() {
        [row] => T::from_row(row),
        rows => Err(DataAccessError::MappingError(format!(
            "expected exactly one row, query returned {}",
            rows.len()
        ))),
    }
}

/// Run a command and return the rows it affected.
///
/// # Errors
/// Returns the execution error.
pub async fn execute<E>(
    exec: &mut E,
    sql: &str,
    params: &[DbValue],
) -> Result<usize, DataAccessError>
where
    E: SqlExecutor + ?Sized,
{
    exec.execute_dml(sql, params).await
}

/// First column of the first row, or `None` when the query returns no rows.
///
/// # Errors
/// Returns the execution error, or a mapping error if the value does not decode as `T`.
pub async fn execute_scalar<T, E>(
    exec: &mut E,
    sql: &str,
    params: &[DbValue],
) -> Result<Option<T>, DataAccessError>
where
    T: FromDbValue,
    E: SqlExecutor + ?Sized,
{
    let result_set = exec.execute_select(sql, params).await?;
    result_set
        .first()
        .map(|row| row.try_get_index::<T>(0))
        .transpose()
}

/// Every result set a batch produced, in order.
///
/// # Errors
/// Returns the execution error.
pub async fn query_multiple<E>(
    exec: &mut E,
    sql: &str,
    params: &[DbValue],
) -> Result<Vec<ResultSet>, DataAccessError>
where
    E: SqlExecutor + ?Sized,
{
    exec.execute_multiple(sql, params).await
}

/// [`query`] over a `{i}` template, using the executor's placeholder style.
///
/// # Errors
/// Returns `DataAccessError::ParameterError` for a bad template, otherwise as [`query`].
pub async fn query_interpolated<T, E>(
    exec: &mut E,
    template: &str,
    args: &[DbValue],
) -> Result<Vec<T>, DataAccessError>
where
    T: FromRow,
    E: SqlExecutor + ?Sized,
{
    let built = build_interpolated_sql(template, args, exec.dialect().placeholders)?;
    query(exec, &built.sql, &built.params).await
}

/// [`execute`] over a `{i}` template.
///
/// # Errors
/// Returns `DataAccessError::ParameterError` for a bad template, otherwise as [`execute`].
pub async fn execute_interpolated<E>(
    exec: &mut E,
    template: &str,
    args: &[DbValue],
) -> Result<usize, DataAccessError>
where
    E: SqlExecutor + ?Sized,
{
    let built = build_interpolated_sql(template, args, exec.dialect().placeholders)?;
    exec.execute_dml(&built.sql, &built.params).await
}
