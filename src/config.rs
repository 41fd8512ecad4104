//! Client configuration
//!
//! Loaded from the process environment, with `.env` support.

use crate::error::AdvisorError;
use std::env;
use std::time::Duration;

const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the advice backend; requests go to `{backend_url}/ask`
    pub backend_url: String,
    /// Port of the local HTTP surface
    pub port: u16,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            port: DEFAULT_PORT,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Load `.env` (if present) and read the environment
    pub fn from_env() -> crate::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let backend_url = lookup("BACKEND_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.backend_url);

        let port = match lookup("PORT").or_else(|| lookup("API_PORT")) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| AdvisorError::Config(format!("invalid port: {}", raw)))?,
            None => defaults.port,
        };

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse().map_err(|_| {
                AdvisorError::Config(format!("invalid REQUEST_TIMEOUT_SECS: {}", raw))
            })?),
            None => defaults.request_timeout,
        };

        Ok(Self {
            backend_url,
            port,
            request_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.backend_url, "http://localhost:8000");
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("BACKEND_URL", "https://advice.example.com"),
            ("API_PORT", "9000"),
            ("REQUEST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.backend_url, "https://advice.example.com");
        assert_eq!(config.port, 9000);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_port_takes_precedence() {
        let config =
            ClientConfig::from_lookup(lookup_from(&[("PORT", "7000"), ("API_PORT", "9000")])).unwrap();
        assert_eq!(config.port, 7000);
    }

    #[test]
    fn test_invalid_port() {
        let result = ClientConfig::from_lookup(lookup_from(&[("PORT", "eighty")]));
        assert!(matches!(result, Err(AdvisorError::Config(_))));
    }
}
