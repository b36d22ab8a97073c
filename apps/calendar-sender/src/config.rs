//! Configuration for the sender process.

use core_config::{app_info, AppInfo, ConfigError, Environment, FromEnv};
use database::PostgresConfig;
use messaging::NatsConfig;

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    /// Audit store; the sender runs without one when `DB_HOST` is unset
    pub database: Option<PostgresConfig>,
    pub nats: NatsConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database = if std::env::var("DB_HOST").is_ok() {
            Some(PostgresConfig::from_env()?)
        } else {
            None
        };

        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            database,
            nats: NatsConfig::from_env()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_store_optional() {
        temp_env::with_var_unset("DB_HOST", || {
            let config = Config::from_env().unwrap();
            assert!(config.database.is_none());
        });
    }

    #[test]
    fn test_audit_store_enabled_by_db_host() {
        temp_env::with_vars(
            [
                ("DB_HOST", Some("localhost")),
                ("DB_USER", Some("calendar")),
                ("DB_PASSWORD", Some("secret")),
                ("DB_NAME", Some("calendar")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(config.database.is_some());
            },
        );
    }
}
