use crate::errors::ConfigError;
use std::env;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_PORT: u16 = 8080;
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base: String,
    pub port: u16,
    pub auto_refresh: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::from_values(
            env::var("LEADS_API_BASE").ok(),
            env::var("PORT").ok(),
            env::var("AUTO_REFRESH").ok(),
        )?;
        info!(
            api_base = %config.api_base,
            port = config.port,
            auto_refresh = config.auto_refresh,
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn from_values(
        api_base: Option<String>,
        port: Option<String>,
        auto_refresh: Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_base = match api_base.filter(|value| !value.trim().is_empty()) {
            Some(url) => {
                let url = url.trim();
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(ConfigError::InvalidBaseUrl(url.to_string()));
                }
                url.trim_end_matches('/').to_string()
            }
            None => DEFAULT_API_BASE.to_string(),
        };

        let port = match port {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|port| *port > 0)
                .ok_or_else(|| ConfigError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };

        let auto_refresh = match auto_refresh {
            Some(raw) => parse_flag("AUTO_REFRESH", &raw)?,
            None => true,
        };

        Ok(Self {
            api_base,
            port,
            auto_refresh,
        })
    }

    pub fn leads_url(&self) -> String {
        format!("{}/leads", self.api_base)
    }
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: raw.to_string(),
        }),
    }
}
