use rusqlite::types::Value;

use crate::types::DbValue;

/// Convert a single `DbValue` to a rusqlite `Value`.
///
/// Timestamps are stored as `YYYY-MM-DD HH:MM:SS[.fff]` text, JSON as its text form.
#[must_use]
pub fn db_value_to_sqlite_value(value: &DbValue) -> Value {
    match value {
        DbValue::Int(i) => Value::Integer(*i),
        DbValue::Float(f) => Value::Real(*f),
        DbValue::Text(s) => Value::Text(s.clone()),
        DbValue::Bool(b) => Value::Integer(i64::from(*b)),
        DbValue::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        DbValue::Null => Value::Null,
        DbValue::Json(jval) => Value::Text(jval.to_string()),
        DbValue::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// Owned `SQLite` parameters, ready to move onto the blocking pool.
pub struct Params(pub Vec<Value>);

impl Params {
    #[must_use]
    pub fn convert(params: &[DbValue]) -> Self {
        Params(params.iter().map(db_value_to_sqlite_value).collect())
    }
}
