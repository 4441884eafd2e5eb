use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use super::row::DbRow;
use crate::error::DataAccessError;
use crate::types::DbValue;

/// Build a value from one materialised row.
///
/// Implemented by hand or through [`entity!`](crate::entity); the query helpers
/// and the repository decode rows through it.
pub trait FromRow: Sized {
    /// # Errors
    /// Returns `DataAccessError::MappingError` if a column is missing or has the wrong type.
    fn from_row(row: &DbRow) -> Result<Self, DataAccessError>;
}

impl FromRow for DbRow {
    fn from_row(row: &DbRow) -> Result<Self, DataAccessError> {
        Ok(row.clone())
    }
}

/// Convert a single column value into a Rust type.
pub trait FromDbValue: Sized {
    /// # Errors
    /// Returns a short reason when the value has an incompatible type.
    fn from_db_value(value: &DbValue) -> Result<Self, String>;
}

fn mismatch(expected: &str, value: &DbValue) -> String {
    format!("expected {expected}, found {value:?}")
}

impl FromDbValue for DbValue {
    fn from_db_value(value: &DbValue) -> Result<Self, String> {
        Ok(value.clone())
    }
}

impl FromDbValue for i64 {
    fn from_db_value(value: &DbValue) -> Result<Self, String> {
        value.as_int().ok_or_else(|| mismatch("integer", value))
    }
}

impl FromDbValue for i32 {
    fn from_db_value(value: &DbValue) -> Result<Self, String> {
        let wide = value.as_int().ok_or_else(|| mismatch("integer", value))?;
        i32::try_from(wide).map_err(|e| format!("{wide} does not fit in i32: {e}"))
    }
}

impl FromDbValue for f64 {
    fn from_db_value(value: &DbValue) -> Result<Self, String> {
        value.as_float().ok_or_else(|| mismatch("float", value))
    }
}

impl FromDbValue for bool {
    fn from_db_value(value: &DbValue) -> Result<Self, String> {
        value.as_bool().ok_or_else(|| mismatch("boolean", value))
    }
}

impl FromDbValue for String {
    fn from_db_value(value: &DbValue) -> Result<Self, String> {
        match value {
            DbValue::Text(s) => Ok(s.clone()),
            DbValue::Json(j) => Ok(j.to_string()),
            _ => Err(mismatch("text", value)),
        }
    }
}

impl FromDbValue for NaiveDateTime {
    fn from_db_value(value: &DbValue) -> Result<Self, String> {
        value.as_timestamp().ok_or_else(|| mismatch("timestamp", value))
    }
}

impl FromDbValue for Vec<u8> {
    fn from_db_value(value: &DbValue) -> Result<Self, String> {
        value
            .as_blob()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| mismatch("blob", value))
    }
}

impl FromDbValue for JsonValue {
    fn from_db_value(value: &DbValue) -> Result<Self, String> {
        match value {
            DbValue::Json(j) => Ok(j.clone()),
            DbValue::Text(s) => serde_json::from_str(s).map_err(|e| format!("invalid JSON: {e}")),
            _ => Err(mismatch("json", value)),
        }
    }
}

impl<T: FromDbValue> FromDbValue for Option<T> {
    fn from_db_value(value: &DbValue) -> Result<Self, String> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_db_value(value).map(Some)
        }
    }
}
