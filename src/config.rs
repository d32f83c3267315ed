use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

use crate::llm::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};

/// Application-level constants
pub const APP_NAME: &str = "RefugeAlly";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:3000", "http://localhost:3001"];

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,refugeally=debug,tower_http=info"
}

/// Get the application data directory
/// ~/RefugeAlly/ on all platforms
pub fn app_data_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(APP_NAME))
}

/// Default location of the triage log database.
pub fn default_database_path() -> Result<PathBuf, ConfigError> {
    Ok(app_data_dir()?.join("refugeally.db"))
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot determine home directory; set REFUGEALLY_DB_PATH")]
    NoHomeDir,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub database_path: PathBuf,
    /// `None` runs triage on rules alone.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub llm_timeout_secs: u64,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = match get("REFUGEALLY_HOST") {
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "REFUGEALLY_HOST",
                value: v,
            })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let port = match get("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue { key: "PORT", value: v })?,
            None => DEFAULT_PORT,
        };

        let llm_timeout_secs = match get("LLM_TIMEOUT_SECS") {
            Some(v) => match v.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "LLM_TIMEOUT_SECS",
                        value: v,
                    })
                }
            },
            None => DEFAULT_LLM_TIMEOUT_SECS,
        };

        let database_path = match get("REFUGEALLY_DB_PATH") {
            Some(v) => PathBuf::from(v),
            None => default_database_path()?,
        };

        let cors_origins = match get("CORS_ORIGINS") {
            Some(v) => v
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            host,
            port,
            database_path,
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            llm_timeout_secs,
            cors_origins,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[("REFUGEALLY_DB_PATH", "/tmp/triage.db")]).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.database_path, PathBuf::from("/tmp/triage.db"));
    }

    #[test]
    fn values_are_read_and_trimmed() {
        let config = config_from(&[
            ("REFUGEALLY_DB_PATH", "/tmp/x.db"),
            ("REFUGEALLY_HOST", "127.0.0.1"),
            ("PORT", " 9000 "),
            ("GEMINI_API_KEY", "abc"),
            ("CORS_ORIGINS", "https://a.org, https://b.org,"),
            ("LLM_TIMEOUT_SECS", "12"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:9000");
        assert_eq!(config.gemini_api_key.as_deref(), Some("abc"));
        assert_eq!(config.cors_origins, vec!["https://a.org", "https://b.org"]);
        assert_eq!(config.llm_timeout_secs, 12);
    }

    #[test]
    fn blank_api_key_means_rules_only() {
        let config = config_from(&[("REFUGEALLY_DB_PATH", "/tmp/x.db"), ("GEMINI_API_KEY", "  ")])
            .unwrap();
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = config_from(&[("REFUGEALLY_DB_PATH", "/tmp/x.db"), ("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "PORT", .. }));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = config_from(&[("REFUGEALLY_DB_PATH", "/tmp/x.db"), ("LLM_TIMEOUT_SECS", "0")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "LLM_TIMEOUT_SECS", .. }));
    }

    #[test]
    fn app_name_is_refugeally() {
        assert_eq!(APP_NAME, "RefugeAlly");
    }
}
