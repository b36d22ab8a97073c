mod config;
mod connector;

pub use config::PostgresConfig;
pub use connector::{connect, connect_with_retry, run_migrations};
