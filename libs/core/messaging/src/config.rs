use core_config::{env_or_default, ConfigError, FromEnv};
use std::env;

/// Broker connection configuration.
///
/// Loaded from the `NATS_*` environment variables:
/// - `NATS_HOST` (default `localhost`)
/// - `NATS_PORT` (default `4222`)
/// - `NATS_USER`, `NATS_PASSWORD` (optional; both or neither)
/// - `NATS_QUEUE` (default `notifications`)
#[derive(Clone, Debug)]
pub struct NatsConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub queue: String,
}

impl NatsConfig {
    /// Build the broker URL for this configuration.
    pub fn url(&self) -> String {
        format!("nats://{}:{}", self.host, self.port)
    }

    /// Credentials as a pair, if configured.
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.user, &self.password) {
            (Some(user), Some(password)) => Some((user.clone(), password.clone())),
            _ => None,
        }
    }
}

impl FromEnv for NatsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let port = env_or_default("NATS_PORT", "4222")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "NATS_PORT".to_string(),
                details: format!("{}", e),
            })?;

        Ok(Self {
            host: env_or_default("NATS_HOST", "localhost"),
            port,
            user: env::var("NATS_USER").ok(),
            password: env::var("NATS_PASSWORD").ok(),
            queue: env_or_default("NATS_QUEUE", "notifications"),
        })
    }
}
