use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::{info, warn};

use backend_domain::{DbConfig, RuntimeConfig};

use super::validation::{validate_bind_addr, validate_http_url, validate_page_sizes};

const CONFIG_PATH_ENV: &str = "BATTLESTATS_CONFIG";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            bind_addr: runtime.bind_addr,
            clickhouse_url: "http://127.0.0.1:8123".to_string(),
            clickhouse_database: "battlestats".to_string(),
            clickhouse_user: None,
            clickhouse_password: None,
            max_body_bytes: runtime.max_body_bytes,
            request_timeout_seconds: runtime.request_timeout_seconds,
            default_page_size: runtime.default_page_size,
            max_page_size: runtime.max_page_size,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        let config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            info!(path = %path, "loaded config file");
            Self::from_toml(&content)?
        } else {
            warn!(path = %path, "config file not found, using defaults");
            AppConfig::default()
        };
        config.finish(|key| env::var(key).ok())
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| anyhow!("invalid config: {}", err))
    }

    /// Applies environment overrides, then normalizes and validates.
    pub fn finish(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        self.apply_env_overrides(lookup);
        self.normalize();
        self.validate()?;
        Ok(self)
    }

    pub fn normalize(&mut self) {
        self.bind_addr = self.bind_addr.trim().to_string();
        self.clickhouse_url = self.clickhouse_url.trim().trim_end_matches('/').to_string();
        self.clickhouse_database = self.clickhouse_database.trim().to_string();
        if let Some(user) = &self.clickhouse_user {
            if user.trim().is_empty() {
                self.clickhouse_user = None;
            }
        }
        if let Some(password) = &self.clickhouse_password {
            if password.trim().is_empty() {
                self.clickhouse_password = None;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_bind_addr(&self.bind_addr)?;
        validate_http_url("clickhouse_url", &self.clickhouse_url)?;
        if self.clickhouse_database.is_empty() {
            return Err(anyhow!("clickhouse_database must not be empty"));
        }
        if !self
            .clickhouse_database
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(anyhow!(
                "clickhouse_database may only contain letters, digits and underscores"
            ));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }
        validate_page_sizes(self.default_page_size, self.max_page_size)
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            clickhouse_url: self.clickhouse_url.clone(),
            clickhouse_database: self.clickhouse_database.clone(),
            clickhouse_user: self.clickhouse_user.clone(),
            clickhouse_password: self.clickhouse_password.clone(),
        }
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("BATTLESTATS_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Some(value) = lookup("BATTLESTATS_CLICKHOUSE_URL") {
            self.clickhouse_url = value;
        }
        if let Some(value) = lookup("BATTLESTATS_CLICKHOUSE_DATABASE") {
            self.clickhouse_database = value;
        }
        if let Some(value) = lookup("BATTLESTATS_CLICKHOUSE_USER") {
            self.clickhouse_user = Some(value);
        }
        if let Some(value) = lookup("BATTLESTATS_CLICKHOUSE_PASSWORD") {
            self.clickhouse_password = Some(value);
        }
        if let Some(value) = lookup("BATTLESTATS_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Some(value) = lookup("BATTLESTATS_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Some(value) = lookup("BATTLESTATS_DEFAULT_PAGE_SIZE") {
            self.default_page_size = value.parse().unwrap_or(self.default_page_size);
        }
        if let Some(value) = lookup("BATTLESTATS_MAX_PAGE_SIZE") {
            self.max_page_size = value.parse().unwrap_or(self.max_page_size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default().finish(no_env).unwrap();
        let runtime = config.to_runtime_config();
        assert_eq!(runtime.default_page_size, 20);
        assert_eq!(runtime.max_page_size, 100);
        assert_eq!(config.to_db_config().clickhouse_database, "battlestats");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
bind_addr = "127.0.0.1:9000"
clickhouse_user = "  "
"#,
        )
        .unwrap()
        .finish(no_env)
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.clickhouse_user, None);
        assert_eq!(config.request_timeout_seconds, 30);
    }

    #[test]
    fn env_overrides_win_over_file() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("BATTLESTATS_MAX_PAGE_SIZE", "50"),
            ("BATTLESTATS_CLICKHOUSE_URL", "http://ch:8123/"),
            ("BATTLESTATS_REQUEST_TIMEOUT_SECONDS", "not-a-number"),
        ]);
        let config = AppConfig::default()
            .finish(|key| env.get(key).map(|value| value.to_string()))
            .unwrap();
        assert_eq!(config.max_page_size, 50);
        assert_eq!(config.clickhouse_url, "http://ch:8123");
        assert_eq!(config.request_timeout_seconds, 30);
    }

    #[test]
    fn rejects_unsafe_database_name() {
        let config = AppConfig {
            clickhouse_database: "stats; DROP".to_string(),
            ..AppConfig::default()
        };
        assert!(config.finish(no_env).is_err());
    }

    #[test]
    fn rejects_default_page_size_above_max() {
        let config = AppConfig {
            default_page_size: 500,
            ..AppConfig::default()
        };
        assert!(config.finish(no_env).is_err());
    }
}
