//! Database connectivity for the calendar services.
//!
//! Provides PostgreSQL connection helpers (pooled options, startup retry)
//! and a generic migration runner. All query logic lives in the domain
//! repositories; this crate only owns the connection lifecycle.

pub mod postgres;
pub mod retry;

pub use postgres::{connect, connect_with_retry, run_migrations, PostgresConfig};
pub use retry::{retry_with_backoff, RetryConfig};
