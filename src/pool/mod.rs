pub mod connection;
pub mod types;

pub use connection::DbConnection;
pub use types::ProviderPool;
