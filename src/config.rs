use std::env;

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Process-wide settings, read once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the Prometheus-compatible database, without a trailing slash.
    pub prometheus_url: String,
    /// The single namespace every query is scoped to.
    pub namespace: String,
    pub port: u16,
    pub log_format: LogFormat,
}

impl Config {
    pub fn new(prometheus_url: &str, namespace: &str) -> Self {
        Self {
            prometheus_url: prometheus_url.trim_end_matches('/').to_string(),
            namespace: namespace.to_string(),
            port: DEFAULT_PORT,
            log_format: LogFormat::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prometheus_url = lookup("PROMETHEUS_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingPrometheusUrl)?;

        let host = prometheus_url
            .strip_prefix("https://")
            .or_else(|| prometheus_url.strip_prefix("http://"))
            .ok_or_else(|| ConfigError::InvalidPrometheusUrl(prometheus_url.clone()))?;
        if host.trim_matches('/').is_empty() {
            return Err(ConfigError::InvalidPrometheusUrl(prometheus_url));
        }

        let namespace = lookup("NAMESPACE")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingNamespace)?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("compact") => LogFormat::Compact,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(ConfigError::InvalidLogFormat(other.to_string())),
        };

        Ok(Self {
            port,
            log_format,
            ..Self::new(&prometheus_url, &namespace)
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
