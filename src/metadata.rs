//! Static entity descriptors.
//!
//! An [`EntityMetadata`] says which table an entity lives in and how each
//! field maps to a column. Descriptors are built once, usually by the
//! [`entity!`](crate::entity) macro, and drive the SQL the
//! [`Repository`](crate::repository::Repository) generates.

use std::collections::HashSet;

use crate::error::DataAccessError;
use crate::results::FromRow;
use crate::types::{DbValue, SqlDialect};

/// How the database fills a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Generated {
    #[default]
    None,
    /// Assigned on insert and read back afterwards.
    Identity,
    /// Never written by the application.
    Computed,
}

/// Mapping of one entity field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    pub field: String,
    pub column: String,
    pub key: bool,
    pub generated: Generated,
    pub required: bool,
    pub not_mapped: bool,
    pub max_length: Option<usize>,
}

impl ColumnMetadata {
    /// A plain column named after its field.
    #[must_use]
    pub fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
            column: field.to_string(),
            key: false,
            generated: Generated::None,
            required: false,
            not_mapped: false,
            max_length: None,
        }
    }

    #[must_use]
    pub fn column_name(mut self, column: &str) -> Self {
        self.column = column.to_string();
        self
    }

    #[must_use]
    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }

    #[must_use]
    pub fn identity(mut self) -> Self {
        self.generated = Generated::Identity;
        self
    }

    #[must_use]
    pub fn computed(mut self) -> Self {
        self.generated = Generated::Computed;
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn not_mapped(mut self) -> Self {
        self.not_mapped = true;
        self
    }

    #[must_use]
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    fn is_written(&self) -> bool {
        !self.not_mapped && self.generated == Generated::None
    }
}

/// Table mapping for one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMetadata {
    pub table: String,
    pub schema: Option<String>,
    pub columns: Vec<ColumnMetadata>,
}

impl EntityMetadata {
    #[must_use]
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            schema: None,
            columns: Vec::new(),
        }
    }

    #[must_use]
    pub fn schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.to_string());
        self
    }

    #[must_use]
    pub fn column(mut self, column: ColumnMetadata) -> Self {
        self.columns.push(column);
        self
    }

    /// Columns that exist in the table, in declaration order.
    pub fn mapped_columns(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.columns.iter().filter(|c| !c.not_mapped)
    }

    pub fn key_columns(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.mapped_columns().filter(|c| c.key)
    }

    /// Columns an `INSERT` writes; generated columns are left to the server.
    pub fn insert_columns(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.columns.iter().filter(|c| c.is_written())
    }

    /// Columns an `UPDATE` sets.
    pub fn update_columns(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.columns.iter().filter(|c| c.is_written() && !c.key)
    }

    #[must_use]
    pub fn identity_column(&self) -> Option<&ColumnMetadata> {
        self.mapped_columns()
            .find(|c| c.generated == Generated::Identity)
    }

    #[must_use]
    pub fn column_for_field(&self, field: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// Column name for `field`, or the field name itself when undeclared.
    #[must_use]
    pub fn column_name_for<'a>(&'a self, field: &'a str) -> &'a str {
        self.column_for_field(field)
            .map_or(field, |c| c.column.as_str())
    }

    /// `schema.table` quoted for `dialect`.
    #[must_use]
    pub fn qualified_table(&self, dialect: SqlDialect) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", dialect.quote(schema), dialect.quote(&self.table)),
            None => dialect.quote(&self.table),
        }
    }

    /// Check the descriptor is usable for CRUD.
    ///
    /// # Errors
    /// Returns `DataAccessError::MappingError` naming the first problem.
    pub fn validate(&self) -> Result<(), DataAccessError> {
        let fail = |reason: String| Err(DataAccessError::MappingError(reason));
        if self.table.trim().is_empty() {
            return fail("entity table name is empty".into());
        }
        if self.key_columns().next().is_none() {
            return fail(format!("table '{}' has no key column", self.table));
        }

        let mut seen = HashSet::new();
        for column in self.mapped_columns() {
            if !seen.insert(column.column.to_lowercase()) {
                return fail(format!(
                    "column '{}' is mapped more than once on '{}'",
                    column.column, self.table
                ));
            }
        }
        if self
            .mapped_columns()
            .filter(|c| c.generated == Generated::Identity)
            .count()
            > 1
        {
            return fail(format!("table '{}' has more than one identity column", self.table));
        }
        if let Some(column) = self.columns.iter().find(|c| c.not_mapped && c.key) {
            return fail(format!("key field '{}' cannot be not-mapped", column.field));
        }
        Ok(())
    }

    /// Check `values` (in mapped column order) against `Required` and
    /// `StringLength` constraints. Generated columns are not checked.
    ///
    /// # Errors
    /// Returns `DataAccessError::ValidationError` for the first offending column,
    /// or `DataAccessError::MappingError` if the value count is wrong.
    pub fn check_values(&self, values: &[DbValue]) -> Result<(), DataAccessError> {
        let mapped: Vec<&ColumnMetadata> = self.mapped_columns().collect();
        if mapped.len() != values.len() {
            return Err(DataAccessError::MappingError(format!(
                "'{}' maps {} columns but {} values were supplied",
                self.table,
                mapped.len(),
                values.len()
            )));
        }

        for (column, value) in mapped.into_iter().zip(values) {
            if column.generated != Generated::None {
                continue;
            }
            if column.required && value.is_null() {
                return Err(DataAccessError::ValidationError {
                    column: column.column.clone(),
                    reason: "value is required".into(),
                });
            }
            if let (Some(max), Some(len)) = (column.max_length, value.text_len())
                && len > max
            {
                return Err(DataAccessError::ValidationError {
                    column: column.column.clone(),
                    reason: format!("length {len} exceeds maximum of {max}"),
                });
            }
        }
        Ok(())
    }
}

/// A type stored in one table.
pub trait Entity: FromRow + Send + Sync {
    fn metadata() -> &'static EntityMetadata;

    /// Field values in [`EntityMetadata::mapped_columns`] order.
    fn values(&self) -> Vec<DbValue>;

    /// Values of the key columns, in key order.
    fn key_values(&self) -> Vec<DbValue> {
        Self::metadata()
            .mapped_columns()
            .zip(self.values())
            .filter(|(column, _)| column.key)
            .map(|(_, value)| value)
            .collect()
    }
}
