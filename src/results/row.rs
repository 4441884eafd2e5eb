use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use super::from_row::FromDbValue;
use crate::error::DataAccessError;
use crate::types::DbValue;

/// A single materialised row.
///
/// Column names are shared by every row of a result set. Lookups by name are
/// case-insensitive, matching how SQL Server and ASE resolve column names.
#[derive(Debug, Clone)]
pub struct DbRow {
    column_names: Arc<Vec<String>>,
    values: Vec<DbValue>,
    column_index: Arc<HashMap<String, usize>>,
}

pub(crate) fn build_column_index(column_names: &[String]) -> Arc<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(column_names.len());
    for (i, name) in column_names.iter().enumerate() {
        // first occurrence wins for duplicated names (joins)
        index.entry(name.to_lowercase()).or_insert(i);
    }
    Arc::new(index)
}

impl DbRow {
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<DbValue>) -> Self {
        let column_index = build_column_index(&column_names);
        Self {
            column_names,
            values,
            column_index,
        }
    }

    pub(crate) fn with_index(
        column_names: Arc<Vec<String>>,
        values: Vec<DbValue>,
        column_index: Arc<HashMap<String, usize>>,
    ) -> Self {
        Self {
            column_names,
            values,
            column_index,
        }
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    #[must_use]
    pub fn values(&self) -> &[DbValue] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.column_index.get(column_name) {
            return Some(idx);
        }
        self.column_index.get(&column_name.to_lowercase()).copied()
    }

    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&DbValue> {
        self.get_column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&DbValue> {
        self.values.get(index)
    }

    /// Decode a column into a Rust value.
    ///
    /// # Errors
    /// Returns `DataAccessError::MappingError` if the column is missing or the
    /// value cannot be converted to `T`.
    pub fn try_get<T: FromDbValue>(&self, column_name: &str) -> Result<T, DataAccessError> {
        let value = self.get(column_name).ok_or_else(|| {
            DataAccessError::MappingError(format!("column '{column_name}' not found in row"))
        })?;
        T::from_db_value(value).map_err(|reason| {
            DataAccessError::MappingError(format!("column '{column_name}': {reason}"))
        })
    }

    /// Decode a column by position.
    ///
    /// # Errors
    /// Returns `DataAccessError::MappingError` if the index is out of range or the
    /// value cannot be converted to `T`.
    pub fn try_get_index<T: FromDbValue>(&self, index: usize) -> Result<T, DataAccessError> {
        let value = self.values.get(index).ok_or_else(|| {
            DataAccessError::MappingError(format!("column index {index} out of range"))
        })?;
        T::from_db_value(value)
            .map_err(|reason| DataAccessError::MappingError(format!("column {index}: {reason}")))
    }

    /// Copy a contiguous range of columns into a standalone row.
    ///
    /// Multi-mapping decodes each range independently, so a `slice` keeps only the
    /// names that belong to it.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> DbRow {
        let end = range.end.min(self.values.len());
        let start = range.start.min(end);
        let names = Arc::new(self.column_names[start..end].to_vec());
        DbRow::new(names, self.values[start..end].to_vec())
    }
}
