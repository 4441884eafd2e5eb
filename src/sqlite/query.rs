use std::sync::Arc;

use rusqlite::Statement;
use rusqlite::types::Value;

use crate::error::DataAccessError;
use crate::results::ResultSet;
use crate::types::DbValue;

/// Extract a `DbValue` from a `SQLite` row.
///
/// # Errors
/// Returns `DataAccessError::SqliteError` if the column cannot be read.
pub fn sqlite_extract_value_sync(
    row: &rusqlite::Row,
    idx: usize,
) -> Result<DbValue, DataAccessError> {
    let value: Value = row.get(idx)?;
    Ok(match value {
        Value::Null => DbValue::Null,
        Value::Integer(i) => DbValue::Int(i),
        Value::Real(f) => DbValue::Float(f),
        Value::Text(s) => DbValue::Text(s),
        Value::Blob(b) => DbValue::Blob(b),
    })
}

/// Run a prepared statement and materialise every row it returns.
///
/// # Errors
/// Returns `DataAccessError` if binding, stepping or value extraction fails.
pub fn build_result_set(
    stmt: &mut Statement,
    params: &[Value],
) -> Result<ResultSet, DataAccessError> {
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let col_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(Arc::new(column_names));

    let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;
    while let Some(row) = rows.next()? {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(sqlite_extract_value_sync(row, i)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}
