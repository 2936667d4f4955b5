use serde::Deserialize;
use std::env;

use crate::services::dialect::DatabaseType;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub merge: MergeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub style: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MergeConfig {
    /// Dialect used when a merge request does not name one
    pub default_database_type: String,
    /// Upper bound on the rows a single merge may materialize
    pub max_rows: usize,
    /// Paginate here even when only one shard answered
    pub decorate_single_shard: bool,
}

impl MergeConfig {
    pub fn database_type(&self) -> crate::error::Result<DatabaseType> {
        DatabaseType::from_str(&self.default_database_type)
    }
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Try to load from .env file
        let _ = dotenv::dotenv();

        let mut builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.style", "auto")?
            .set_default("merge.default_database_type", "mysql")?
            .set_default("merge.max_rows", 10_000)?
            .set_default("merge.decorate_single_shard", false)?;

        if let Ok(host) = env::var("HOST") {
            builder = builder.set_override("server.host", host)?;
        }

        if let Ok(port) = env::var("PORT") {
            builder = builder.set_override("server.port", port.parse::<u16>().unwrap_or(3000))?;
        }

        if let Ok(log_level) = env::var("RUST_LOG") {
            builder = builder.set_override("logging.level", log_level)?;
        }

        if let Ok(log_style) = env::var("RUST_LOG_STYLE") {
            builder = builder.set_override("logging.style", log_style)?;
        }

        if let Ok(database_type) = env::var("MERGE_DEFAULT_DATABASE_TYPE") {
            builder = builder.set_override("merge.default_database_type", database_type)?;
        }

        if let Ok(max_rows) = env::var("MERGE_MAX_ROWS") {
            let max_rows = max_rows
                .parse::<i64>()
                .map_err(|e| config::ConfigError::Message(format!("MERGE_MAX_ROWS: {}", e)))?;
            builder = builder.set_override("merge.max_rows", max_rows)?;
        }

        if let Ok(decorate) = env::var("MERGE_DECORATE_SINGLE_SHARD") {
            builder = builder.set_override(
                "merge.decorate_single_shard",
                matches!(decorate.to_lowercase().as_str(), "1" | "true" | "yes"),
            )?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::from_env();
        assert!(config.is_ok());

        let config = config.unwrap();
        assert!(config.merge.max_rows > 0);
        assert!(!config.server.host.is_empty());
    }

    #[test]
    fn test_merge_database_type() {
        let merge = MergeConfig {
            default_database_type: "mssql".to_string(),
            max_rows: 10,
            decorate_single_shard: false,
        };
        assert_eq!(merge.database_type().unwrap(), DatabaseType::SQLServer);

        let merge = MergeConfig {
            default_database_type: "db2".to_string(),
            ..merge
        };
        assert!(merge.database_type().is_err());
    }
}
