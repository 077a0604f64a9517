//! Resolving tenant database connections.

pub mod conn_str;
pub mod error;
pub mod lookup;
pub mod provider;

pub use conn_str::parse_connection_string;
pub use error::ConnectionError;
pub use lookup::ConnectionStringClient;
pub use provider::{ConnectionProvider, TenantConnection};
