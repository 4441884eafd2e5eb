use std::sync::Arc;

use odbc_api::parameter::InputParameter;
use odbc_api::{Bit, Cursor, DataType, IntoParameter, ResultSetMetadata};

use crate::error::DataAccessError;
use crate::results::ResultSet;
use crate::types::DbValue;

/// Convert `DbValue`s into boxed ODBC input parameters, bound positionally.
#[must_use]
pub fn convert_params(params: &[DbValue]) -> Vec<Box<dyn InputParameter>> {
    params
        .iter()
        .map(|value| -> Box<dyn InputParameter> {
            match value {
                DbValue::Int(i) => Box::new(*i),
                DbValue::Float(f) => Box::new(*f),
                DbValue::Bool(b) => Box::new(Bit::from_bool(*b)),
                DbValue::Text(s) => Box::new(s.clone().into_parameter()),
                // ASE converts character data to datetime implicitly
                DbValue::Timestamp(dt) => {
                    Box::new(dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string().into_parameter())
                }
                DbValue::Json(j) => Box::new(j.to_string().into_parameter()),
                DbValue::Blob(bytes) => Box::new(bytes.clone().into_parameter()),
                DbValue::Null => Box::new(None::<String>.into_parameter()),
            }
        })
        .collect()
}

#[derive(Clone, Copy)]
enum ColumnKind {
    Integer,
    Exact { scale: i16 },
    Float,
    Bit,
    Binary,
    Temporal,
    Text,
}

fn column_kind(data_type: DataType) -> ColumnKind {
    match data_type {
        DataType::Integer | DataType::SmallInt | DataType::BigInt | DataType::TinyInt => {
            ColumnKind::Integer
        }
        DataType::Numeric { scale, .. } | DataType::Decimal { scale, .. } => {
            ColumnKind::Exact { scale }
        }
        DataType::Float { .. } | DataType::Real | DataType::Double => ColumnKind::Float,
        DataType::Bit => ColumnKind::Bit,
        DataType::Binary { .. } | DataType::Varbinary { .. } | DataType::LongVarbinary { .. } => {
            ColumnKind::Binary
        }
        DataType::Timestamp { .. } | DataType::Date => ColumnKind::Temporal,
        _ => ColumnKind::Text,
    }
}

fn parse_text(kind: ColumnKind, text: &str) -> DbValue {
    let trimmed = text.trim();
    let parsed = match kind {
        ColumnKind::Integer => trimmed.parse().ok().map(DbValue::Int),
        ColumnKind::Exact { scale: 0 } => trimmed.parse().ok().map(DbValue::Int),
        ColumnKind::Exact { .. } | ColumnKind::Float => trimmed.parse().ok().map(DbValue::Float),
        ColumnKind::Bit => Some(DbValue::Bool(trimmed == "1")),
        ColumnKind::Temporal => DbValue::Text(trimmed.to_string())
            .as_timestamp()
            .map(DbValue::Timestamp),
        ColumnKind::Binary | ColumnKind::Text => None,
    };
    parsed.unwrap_or_else(|| DbValue::Text(text.to_string()))
}

/// Materialise every row of the cursor's current result.
///
/// # Errors
/// Returns `DataAccessError::OdbcError` if fetching fails.
pub fn build_result_set<C: Cursor>(cursor: &mut C) -> Result<ResultSet, DataAccessError> {
    let col_count = u16::try_from(cursor.num_result_cols()?).unwrap_or(0);
    let mut names = Vec::with_capacity(usize::from(col_count));
    let mut kinds = Vec::with_capacity(usize::from(col_count));
    for col in 1..=col_count {
        names.push(cursor.col_name(col)?);
        kinds.push(column_kind(cursor.col_data_type(col)?));
    }

    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(Arc::new(names));

    let mut buf = Vec::new();
    while let Some(mut row) = cursor.next_row()? {
        let mut values = Vec::with_capacity(kinds.len());
        for (col, kind) in (1..=col_count).zip(kinds.iter().copied()) {
            buf.clear();
            let value = if let ColumnKind::Binary = kind {
                if row.get_binary(col, &mut buf)? {
                    DbValue::Blob(buf.clone())
                } else {
                    DbValue::Null
                }
            } else if row.get_text(col, &mut buf)? {
                parse_text(kind, &String::from_utf8_lossy(&buf))
            } else {
                DbValue::Null
            };
            values.push(value);
        }
        result_set.add_row_values(values);
    }

    Ok(result_set)
}
