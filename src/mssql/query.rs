use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use futures_util::TryStreamExt;
use tiberius::{ColumnData, FromSql, QueryItem, QueryStream};

use crate::error::DataAccessError;
use crate::results::ResultSet;
use crate::types::DbValue;

/// Drain a query stream into one `ResultSet` per result the server produced.
///
/// Statements that return no columns (DECLARE, assignments, DML without
/// OUTPUT) produce no metadata and therefore no entry.
///
/// # Errors
/// Returns `DataAccessError::MssqlError` if the stream fails, or a conversion error.
pub async fn build_result_sets(
    mut stream: QueryStream<'_>,
) -> Result<Vec<ResultSet>, DataAccessError> {
    let mut sets: Vec<ResultSet> = Vec::new();

    while let Some(item) = stream.try_next().await? {
        match item {
            QueryItem::Metadata(meta) => {
                let names: Vec<String> = meta
                    .columns()
                    .iter()
                    .map(|col| col.name().to_string())
                    .collect();
                let mut result_set = ResultSet::with_capacity(10);
                result_set.set_column_names(Arc::new(names));
                sets.push(result_set);
            }
            QueryItem::Row(row) => {
                let mut values = Vec::with_capacity(row.len());
                for (_, data) in row.cells() {
                    values.push(extract_value(data)?);
                }
                if let Some(current) = sets.last_mut() {
                    current.add_row_values(values);
                }
            }
        }
    }

    Ok(sets)
}

fn decode_err(e: tiberius::error::Error) -> DataAccessError {
    DataAccessError::MappingError(format!("SQL Server value decode error: {e}"))
}

/// Map one tiberius cell onto a `DbValue`.
fn extract_value(data: &ColumnData<'static>) -> Result<DbValue, DataAccessError> {
    let value = match data {
        ColumnData::U8(v) => v.map(|v| DbValue::Int(i64::from(v))),
        ColumnData::I16(v) => v.map(|v| DbValue::Int(i64::from(v))),
        ColumnData::I32(v) => v.map(|v| DbValue::Int(i64::from(v))),
        ColumnData::I64(v) => v.map(DbValue::Int),
        ColumnData::F32(v) => v.map(|v| DbValue::Float(f64::from(v))),
        ColumnData::F64(v) => v.map(DbValue::Float),
        ColumnData::Bit(v) => v.map(DbValue::Bool),
        ColumnData::String(v) => v.as_ref().map(|s| DbValue::Text(s.to_string())),
        ColumnData::Guid(v) => v.as_ref().map(|g| DbValue::Text(g.to_string())),
        ColumnData::Binary(v) => v.as_ref().map(|b| DbValue::Blob(b.to_vec())),
        ColumnData::Numeric(v) => v.as_ref().map(|n| {
            if n.scale() == 0
                && let Ok(int) = i64::try_from(n.value())
            {
                DbValue::Int(int)
            } else {
                DbValue::Float(n.to_string().parse().unwrap_or(f64::NAN))
            }
        }),
        ColumnData::Xml(v) => v
            .as_ref()
            .map(|xml| DbValue::Text(xml.as_ref().clone().into_string())),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            NaiveDateTime::from_sql(data)
                .map_err(decode_err)?
                .map(DbValue::Timestamp)
        }
        ColumnData::Date(_) => NaiveDate::from_sql(data)
            .map_err(decode_err)?
            .map(|d| DbValue::Timestamp(d.and_time(NaiveTime::MIN))),
        ColumnData::Time(_) => NaiveTime::from_sql(data)
            .map_err(decode_err)?
            .map(|t| DbValue::Text(t.to_string())),
        ColumnData::DateTimeOffset(_) => DateTime::<Utc>::from_sql(data)
            .map_err(decode_err)?
            .map(|dt| DbValue::Timestamp(dt.naive_utc())),
        #[allow(unreachable_patterns)]
        _ => None,
    };
    Ok(value.unwrap_or(DbValue::Null))
}
