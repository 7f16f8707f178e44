//! Configuration for the Revenuebase MCP server

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable holding the upstream API key
pub const API_KEY_ENV: &str = "REVENUEBASE_API_KEY";
pub const BASE_URL_ENV: &str = "REVENUEBASE_BASE_URL";
pub const TIMEOUT_ENV: &str = "REVENUEBASE_TIMEOUT_SECS";
pub const ACCEPT_INVALID_CERTS_ENV: &str = "REVENUEBASE_ACCEPT_INVALID_CERTS";

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Upstream API key. Only ever read from the environment.
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Versioned upstream base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Skip TLS certificate verification for upstream calls
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// MCP server port (for HTTP transport)
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            accept_invalid_certs: false,
            http_port: default_http_port(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("http_port", &self.http_port)
            .finish()
    }
}

impl Config {
    /// Load config from the default file (if any) and apply environment overrides
    pub fn load() -> Result<Self> {
        let config = match Self::config_path() {
            Some(path) if path.exists() => Self::read_file(&path)?,
            _ => Config::default(),
        };
        config.apply_env()
    }

    /// Load config from a specific file and apply environment overrides
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        Self::read_file(path)?.apply_env()
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(self) -> Result<Self> {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Apply overrides using an arbitrary variable lookup
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // An empty key is treated the same as an unset one
        self.api_key = lookup(API_KEY_ENV).filter(|key| !key.trim().is_empty());

        if let Some(url) = lookup(BASE_URL_ENV) {
            self.base_url = url;
        }

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            self.timeout_secs = raw.trim().parse().map_err(|_| {
                Error::Config(format!("{} must be a whole number of seconds, got {:?}", TIMEOUT_ENV, raw))
            })?;
        }

        if let Some(raw) = lookup(ACCEPT_INVALID_CERTS_ENV) {
            self.accept_invalid_certs = parse_flag(&raw).ok_or_else(|| {
                Error::Config(format!("{} must be true or false, got {:?}", ACCEPT_INVALID_CERTS_ENV, raw))
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(Error::Config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than zero".into()));
        }
        Ok(())
    }

    /// Default config file location
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("revenuebase-mcp").join("config.toml"))
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Full URL for an endpoint path such as `credits`
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// Default value functions

fn default_base_url() -> String {
    "https://api.revenuebase.ai/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_http_port() -> u16 {
    3941
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, "https://api.revenuebase.ai/v1");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(!config.accept_invalid_certs);
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_api_key_from_env() {
        let config = Config::default()
            .apply_env_with(env(&[(API_KEY_ENV, "secret")]))
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_empty_api_key_is_absent() {
        let config = Config::default()
            .apply_env_with(env(&[(API_KEY_ENV, "   ")]))
            .unwrap();
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .apply_env_with(env(&[
                (BASE_URL_ENV, "http://127.0.0.1:9000/v1"),
                (TIMEOUT_ENV, "5"),
                (ACCEPT_INVALID_CERTS_ENV, "true"),
            ]))
            .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:9000/v1");
        assert_eq!(config.timeout_secs, 5);
        assert!(config.accept_invalid_certs);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = Config::default()
            .apply_env_with(env(&[(API_KEY_ENV, "secret")]))
            .unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let result = Config::default().apply_env_with(env(&[(TIMEOUT_ENV, "soon")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = Config::default().apply_env_with(env(&[(BASE_URL_ENV, "api.revenuebase.ai")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_endpoint_url_joins_cleanly() {
        let mut config = Config::default();
        assert_eq!(
            config.endpoint_url("credits"),
            "https://api.revenuebase.ai/v1/credits"
        );

        config.base_url = "http://localhost:8080/v1/".to_string();
        assert_eq!(
            config.endpoint_url("/process-email"),
            "http://localhost:8080/v1/process-email"
        );
    }

    #[test]
    fn test_read_file_with_partial_settings() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "timeout_secs = 12\nhttp_port = 4000\n").unwrap();

        let config = Config::read_file(&path).unwrap();
        assert_eq!(config.timeout_secs, 12);
        assert_eq!(config.http_port, 4000);
        assert_eq!(config.base_url, "https://api.revenuebase.ai/v1");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_env_base_url_repairs_bad_file_value() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "base_url = \"api.revenuebase.ai\"\n").unwrap();

        let config = Config::read_file(&path)
            .unwrap()
            .apply_env_with(env(&[(BASE_URL_ENV, "https://staging.revenuebase.ai/v1")]))
            .unwrap();
        assert_eq!(config.base_url, "https://staging.revenuebase.ai/v1");

        let result = Config::read_file(&path).unwrap().apply_env_with(env(&[]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load_from_path(&temp_dir.path().join("nope.toml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
