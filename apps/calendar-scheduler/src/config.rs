//! Configuration for the scheduler process.

use core_config::{app_info, env_parse_or, AppInfo, ConfigError, Environment, FromEnv};
use database::PostgresConfig;
use messaging::NatsConfig;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub database: PostgresConfig,
    pub nats: NatsConfig,
    /// Tick interval (`SCHEDULER_INTERVAL_SECONDS`, default 60)
    pub interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let interval_seconds: u64 = env_parse_or("SCHEDULER_INTERVAL_SECONDS", 60)?;

        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            database: PostgresConfig::from_env()?,
            nats: NatsConfig::from_env()?,
            interval: Duration::from_secs(interval_seconds.max(1)),
        })
    }
}
