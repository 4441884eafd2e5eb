// SQL Server backend - tiberius over a bb8 pool
//
// - config: pool setup from an ADO.NET connection string
// - params: binding DbValue parameters onto tiberius queries
// - query: result extraction and building (one ResultSet per result)
// - executor: batch / select / dml / multi-result execution

pub mod config;
pub mod executor;
pub mod params;
pub mod query;

pub use config::{MssqlClient, MssqlPool, MssqlPooledConnection, build_pool};
pub use executor::{execute_batch, execute_dml, execute_multiple, execute_select};
pub use params::bind_query_params;
pub use query::build_result_sets;
