//! Configuration for the calendar API process.

use core_config::server::ServerConfig;
use core_config::{app_info, env_or_default, AppInfo, ConfigError, Environment, FromEnv};
use database::PostgresConfig;

/// Storage backend selector (`STORAGE_TYPE`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageType {
    Memory,
    Sql,
}

impl std::str::FromStr for StorageType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageType::Memory),
            "sql" => Ok(StorageType::Sql),
            other => Err(ConfigError::ParseError {
                key: "STORAGE_TYPE".to_string(),
                details: format!("unknown storage type '{}', expected memory or sql", other),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub storage: StorageType,
    /// Present when `storage` is [`StorageType::Sql`]
    pub database: Option<PostgresConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let storage: StorageType = env_or_default("STORAGE_TYPE", "memory").parse()?;

        let database = match storage {
            StorageType::Sql => Some(PostgresConfig::from_env()?),
            StorageType::Memory => None,
        };

        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            storage,
            database,
        })
    }
}
