//! Statement execution over a connection or a unit of work.
//!
//! [`SqlExecutor`] is the four-call contract every backend implements. The free
//! functions in this module layer row decoding, interpolation and
//! multi-mapping on top of it, so they work the same inside or outside a
//! transaction.

mod dispatch;
mod helpers;
mod multimap;

use async_trait::async_trait;

use crate::error::DataAccessError;
use crate::results::ResultSet;
use crate::types::{DbValue, Provider, SqlDialect};

pub use helpers::{
    execute, execute_interpolated, execute_scalar, query, query_first, query_interpolated,
    query_multiple, query_single,
};
pub use multimap::{query_map2, query_map3};

/// Anything that can run SQL against one provider.
#[async_trait]
pub trait SqlExecutor: Send {
    fn provider(&self) -> Provider;

    fn dialect(&self) -> SqlDialect {
        self.provider().dialect()
    }

    /// Run one or more statements without parameters, discarding any rows.
    async fn execute_batch(&mut self, sql: &str) -> Result<(), DataAccessError>;

    /// Run a query and return its first result set.
    async fn execute_select(
        &mut self,
        sql: &str,
        params: &[DbValue],
    ) -> Result<ResultSet, DataAccessError>;

    /// Run a command and return the number of rows it touched.
    async fn execute_dml(&mut self, sql: &str, params: &[DbValue])
    -> Result<usize, DataAccessError>;

    /// Run a batch and return every result set it produced.
    async fn execute_multiple(
        &mut self,
        sql: &str,
        params: &[DbValue],
    ) -> Result<Vec<ResultSet>, DataAccessError>;
}
