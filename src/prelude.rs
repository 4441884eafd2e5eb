//! Common imports.
//!
//! ```rust
//! use sql_access::prelude::*;
//! ```

pub use crate::config::{ConnectionSettings, DataAccessConfig};
pub use crate::error::DataAccessError;
pub use crate::executor::{
    SqlExecutor, execute, execute_interpolated, execute_scalar, query, query_first,
    query_interpolated, query_map2, query_map3, query_multiple, query_single,
};
pub use crate::factory::ConnectionFactory;
pub use crate::interpolate::{InterpolatedSql, build_interpolated_sql};
pub use crate::metadata::{ColumnMetadata, Entity, EntityMetadata, Generated};
pub use crate::pool::DbConnection;
pub use crate::procedure::{
    OutputParam, ParamDirection, ProcedureCall, ProcedureParam, ProcedureResult, SqlType,
    execute_procedure,
};
pub use crate::repository::Repository;
pub use crate::results::{DbRow, FromDbValue, FromRow, ResultSet};
pub use crate::types::{DbValue, PlaceholderStyle, Provider, SqlDialect};
pub use crate::uow::UnitOfWork;
