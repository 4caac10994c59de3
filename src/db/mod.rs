pub mod postgres;
pub mod tls;
pub mod types;

pub use postgres::PostgresConnection;
pub use types::TableList;
