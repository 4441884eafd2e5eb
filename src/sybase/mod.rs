// Sybase ASE backend - odbc-api on the blocking pool
//
// - connection: shared ODBC environment and per-checkout connections
// - query: cursor materialisation and parameter conversion
// - executor: batch / select / dml / multi-result execution

pub mod connection;
pub mod executor;
pub mod query;

pub use connection::SybaseConnection;
pub use executor::{execute_batch, execute_dml, execute_multiple, execute_select};
