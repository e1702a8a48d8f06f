use std::time::Duration;

use serde::{Deserialize, Serialize};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use once_cell::sync::OnceCell;

pub static CONFIG: OnceCell<Configuration> = OnceCell::new();

/// Location of the wide log table inside the SQL engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogStoreConfig {
    /// DSN the serving layer uses to reach the SQL engine
    pub dsn: String,
    /// Database holding the log table
    pub database: String,
    /// Name of the wide log table
    pub table: String,
}

impl Default for LogStoreConfig {
    fn default() -> Self {
        Self {
            dsn: String::from("clickhouse://localhost:9000"),
            database: String::from("otel"),
            table: String::from("logs"),
        }
    }
}

/// Limits applied to incoming queries before translation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Row limit applied when a request carries none
    pub default_limit: u32,
    /// Hard cap on the row limit a single request may ask for
    pub max_limit: u32,
    /// Time budget the serving layer attaches to query execution
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: 100,
            max_limit: 5000,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Configuration {
    /// Log store location (engine DSN, database, table)
    pub log_store: LogStoreConfig,
    /// Query limits
    pub query: QueryConfig,
}

impl Configuration {
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config = Figment::from(Serialized::defaults(Configuration::default()))
            .merge(Toml::file("loggia.toml"))
            .merge(Env::prefixed("LOGGIA__").split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration() {
        let config = Configuration::default();

        assert_eq!(config.log_store.database, "otel");
        assert_eq!(config.log_store.table, "logs");
        assert_eq!(config.query.default_limit, 100);
        assert_eq!(config.query.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_configless_operation() {
        // Defaults alone must produce a loadable configuration
        let config = Figment::from(Serialized::defaults(Configuration::default()))
            .extract::<Configuration>()
            .unwrap();

        assert_eq!(config.log_store.dsn, "clickhouse://localhost:9000");
        assert_eq!(config.query.max_limit, 5000);
    }

    #[test]
    fn test_env_var_override() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LOGGIA__LOG_STORE__DATABASE", "observability");
            jail.set_env("LOGGIA__LOG_STORE__TABLE", "otel_logs");
            jail.set_env("LOGGIA__QUERY__DEFAULT_LIMIT", "500");

            let config = Configuration::load().expect("load configuration");

            assert_eq!(config.log_store.database, "observability");
            assert_eq!(config.log_store.table, "otel_logs");
            assert_eq!(config.query.default_limit, 500);
            Ok(())
        });
    }

    #[test]
    fn test_toml_file_override() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "loggia.toml",
                r#"
                [log_store]
                dsn = "clickhouse://ch.internal:9440"
                database = "otel"
                table = "logs_wide"

                [query]
                timeout = "10s"
                "#,
            )?;

            let config = Configuration::load().expect("load configuration");

            assert_eq!(config.log_store.dsn, "clickhouse://ch.internal:9440");
            assert_eq!(config.log_store.table, "logs_wide");
            assert_eq!(config.query.timeout, Duration::from_secs(10));
            // Sections absent from the file keep their defaults
            assert_eq!(config.query.max_limit, 5000);
            Ok(())
        });
    }
}
