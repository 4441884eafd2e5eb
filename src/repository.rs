//! CRUD over one entity type.

use std::marker::PhantomData;

use tracing::debug;

use crate::error::DataAccessError;
use crate::executor::{SqlExecutor, execute_scalar, query, query_first};
use crate::interpolate::build_interpolated_sql;
use crate::metadata::{ColumnMetadata, Entity, EntityMetadata};
use crate::types::{DbValue, Provider, SqlDialect};

/// Generic repository for `T`, running on a connection or a unit of work.
///
/// SQL is generated from `T::metadata()` in the executor's dialect.
pub struct Repository<'a, T, E>
where
    T: Entity,
    E: SqlExecutor + ?Sized,
{
    exec: &'a mut E,
    dialect: SqlDialect,
    _entity: PhantomData<fn() -> T>,
}

fn column_list<'c>(
    dialect: SqlDialect,
    columns: impl Iterator<Item = &'c ColumnMetadata>,
) -> String {
    columns
        .map(|c| dialect.quote(&c.column))
        .collect::<Vec<_>>()
        .join(", ")
}

impl<'a, T, E> Repository<'a, T, E>
where
    T: Entity,
    E: SqlExecutor + ?Sized,
{
    /// # Errors
    /// Returns `DataAccessError::MappingError` if `T`'s metadata does not validate.
    pub fn new(exec: &'a mut E) -> Result<Self, DataAccessError> {
        T::metadata().validate()?;
        let dialect = exec.dialect();
        Ok(Self {
            exec,
            dialect,
            _entity: PhantomData,
        })
    }

    fn meta(&self) -> &'static EntityMetadata {
        T::metadata()
    }

    fn table(&self) -> String {
        self.meta().qualified_table(self.dialect)
    }

    fn select_prefix(&self) -> String {
        format!(
            "SELECT {} FROM {}",
            column_list(self.dialect, self.meta().mapped_columns()),
            self.table()
        )
    }

    /// `k1 = <p>, k2 = <p>` joined with `AND`, numbering from `first`.
    fn key_predicate(&self, first: usize) -> String {
        self.meta()
            .key_columns()
            .enumerate()
            .map(|(i, c)| {
                format!(
                    "{} = {}",
                    self.dialect.quote(&c.column),
                    self.dialect.placeholders.placeholder(first + i)
                )
            })
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    fn check_key(&self, key: &[DbValue]) -> Result<(), DataAccessError> {
        let expected = self.meta().key_columns().count();
        if key.len() == expected {
            Ok(())
        } else {
            Err(DataAccessError::ParameterError(format!(
                "'{}' has {expected} key column(s) but {} key value(s) were given",
                self.meta().table,
                key.len()
            )))
        }
    }

    /// Row with the given key values, in key column order.
    ///
    /// # Errors
    /// Returns `DataAccessError::ParameterError` on key arity mismatch, otherwise the query error.
    pub async fn get(&mut self, key: &[DbValue]) -> Result<Option<T>, DataAccessError> {
        self.check_key(key)?;
        let sql = format!("{} WHERE {}", self.select_prefix(), self.key_predicate(1));
        query_first(self.exec, &sql, key).await
    }

    /// # Errors
    /// Returns the query or mapping error.
    pub async fn get_all(&mut self) -> Result<Vec<T>, DataAccessError> {
        let sql = self.select_prefix();
        query(self.exec, &sql, &[]).await
    }

    /// Rows matching an interpolated `WHERE` clause, e.g. `"total > {0}"`.
    ///
    /// # Errors
    /// Returns `DataAccessError::ParameterError` for a bad template, otherwise the query error.
    pub async fn find(
        &mut self,
        where_template: &str,
        args: &[DbValue],
    ) -> Result<Vec<T>, DataAccessError> {
        let template = format!("{} WHERE {where_template}", self.select_prefix());
        let built = build_interpolated_sql(&template, args, self.dialect.placeholders)?;
        query(self.exec, &built.sql, &built.params).await
    }

    /// Insert `entity`, returning the generated identity when the table has one.
    ///
    /// # Errors
    /// Returns `DataAccessError::ValidationError` if a constraint fails, otherwise the
    /// execution error.
    pub async fn insert(&mut self, entity: &T) -> Result<Option<i64>, DataAccessError> {
        let meta = self.meta();
        let values = entity.values();
        meta.check_values(&values)?;

        let params: Vec<DbValue> = meta
            .mapped_columns()
            .zip(values)
            .filter(|(c, _)| meta.insert_columns().any(|ic| ic.field == c.field))
            .map(|(_, v)| v)
            .collect();
        let columns = column_list(self.dialect, meta.insert_columns());
        let markers = (1..=params.len())
            .map(|i| self.dialect.placeholders.placeholder(i))
            .collect::<Vec<_>>()
            .join(", ");
        let identity = meta.identity_column();
        let table = self.table();

        let output = match (self.dialect.provider, identity) {
            (Provider::Mssql, Some(id)) => {
                format!(" OUTPUT INSERTED.{}", self.dialect.quote(&id.column))
            }
            _ => String::new(),
        };
        let sql = if params.is_empty() {
            format!("INSERT INTO {table}{output} DEFAULT VALUES")
        } else {
            format!("INSERT INTO {table} ({columns}){output} VALUES ({markers})")
        };
        debug!(table = %meta.table, "repository insert");

        let Some(id) = identity else {
            self.exec.execute_dml(&sql, &params).await?;
            return Ok(None);
        };
        let generated = match self.dialect.provider {
            Provider::Mssql => execute_scalar::<i64, _>(self.exec, &sql, &params).await,
            // identity functions are per connection, so the follow-up must reuse it
            Provider::Sybase => {
                self.exec.execute_dml(&sql, &params).await?;
                execute_scalar::<Option<i64>, _>(self.exec, "SELECT @@identity", &[])
                    .await
                    .map(Option::flatten)
            }
            Provider::Sqlite => {
                self.exec.execute_dml(&sql, &params).await?;
                execute_scalar::<i64, _>(self.exec, "SELECT last_insert_rowid()", &[]).await
            }
        };
        generated.map_err(|e| match e {
            DataAccessError::MappingError(reason) => DataAccessError::MappingError(format!(
                "reading identity '{}': {reason}",
                id.column
            )),
            other => other,
        })
    }

    /// Update every non-key column of `entity` by its key.
    ///
    /// # Errors
    /// Returns `DataAccessError::MappingError` if the entity has no updatable
    /// columns, a validation error, or the execution error.
    pub async fn update(&mut self, entity: &T) -> Result<usize, DataAccessError> {
        let meta = self.meta();
        let values = entity.values();
        meta.check_values(&values)?;

        let mut params: Vec<DbValue> = meta
            .mapped_columns()
            .zip(values)
            .filter(|(c, _)| meta.update_columns().any(|uc| uc.field == c.field))
            .map(|(_, v)| v)
            .collect();
        if params.is_empty() {
            return Err(DataAccessError::MappingError(format!(
                "'{}' has no updatable columns",
                meta.table
            )));
        }
        let assignments = meta
            .update_columns()
            .enumerate()
            .map(|(i, c)| {
                format!(
                    "{} = {}",
                    self.dialect.quote(&c.column),
                    self.dialect.placeholders.placeholder(i + 1)
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE {}",
            self.table(),
            self.key_predicate(params.len() + 1)
        );
        params.extend(entity.key_values());
        self.exec.execute_dml(&sql, &params).await
    }

    /// # Errors
    /// Returns the execution error.
    pub async fn delete(&mut self, entity: &T) -> Result<usize, DataAccessError> {
        self.delete_by_key(&entity.key_values()).await
    }

    /// # Errors
    /// Returns `DataAccessError::ParameterError` on key arity mismatch, otherwise the
    /// execution error.
    pub async fn delete_by_key(&mut self, key: &[DbValue]) -> Result<usize, DataAccessError> {
        self.check_key(key)?;
        let sql = format!("DELETE FROM {} WHERE {}", self.table(), self.key_predicate(1));
        self.exec.execute_dml(&sql, key).await
    }

    /// # Errors
    /// Returns the query error.
    pub async fn count(&mut self) -> Result<i64, DataAccessError> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table());
        Ok(execute_scalar::<i64, _>(self.exec, &sql, &[])
            .await?
            .unwrap_or(0))
    }

    /// # Errors
    /// Returns `DataAccessError::ParameterError` on key arity mismatch, otherwise the query error.
    pub async fn exists(&mut self, key: &[DbValue]) -> Result<bool, DataAccessError> {
        self.check_key(key)?;
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            self.table(),
            self.key_predicate(1)
        );
        let found = execute_scalar::<i64, _>(self.exec, &sql, key).await?;
        Ok(found.unwrap_or(0) > 0)
    }
}
