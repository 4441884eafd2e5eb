//! Async data access over SQL Server, Sybase ASE and `SQLite`.
//!
//! - [`ConnectionFactory`](factory::ConnectionFactory) resolves configured aliases to pooled connections.
//! - [`UnitOfWork`](uow::UnitOfWork) wraps one connection in a transaction.
//! - The [`executor`] helpers run text, interpolated and multi-mapped queries.
//! - [`execute_procedure`](procedure::execute_procedure) calls stored procedures with typed outputs.
//! - [`Repository`](repository::Repository) generates CRUD from [`metadata`] descriptors.
//!
//! ```rust,no_run
//! use sql_access::prelude::*;
//!
//! # async fn demo() -> Result<(), DataAccessError> {
//! let config = DataAccessConfig::new()
//!     .with_connection("scratch", ConnectionSettings::new(Provider::Sqlite, "/tmp/scratch.db"))
//!     .with_default_alias("scratch");
//! let factory = ConnectionFactory::new(config)?;
//!
//! let mut conn = factory.open_default().await?;
//! let n: Option<i64> = execute_scalar(&mut conn, "SELECT 1 + 1", &[]).await?;
//! assert_eq!(n, Some(2));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod factory;
pub mod interpolate;
mod macros;
pub mod metadata;
pub mod pool;
pub mod prelude;
pub mod procedure;
pub mod repository;
pub mod results;
pub mod types;
pub mod uow;

#[cfg(feature = "mssql")]
pub mod mssql;
#[cfg(feature = "sqlite")]
pub mod sqlite;
#[cfg(feature = "sybase")]
pub mod sybase;

pub use error::DataAccessError;
pub use factory::ConnectionFactory;
pub use types::{DbValue, Provider};
