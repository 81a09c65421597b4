//! Listener, logging and HTTP surface settings

use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;

use super::error::ValidationError;

/// Where and how the relay listens
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind; an IP literal or a resolvable hostname
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Deployment stage; production switches logs to JSON
    #[serde(default = "default_environment")]
    pub environment: Environment,

    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Comma-separated browser origins; unset allows any origin
    pub cors_origins: Option<String>,

    /// Requests per client per window on `/api/*`; 0 turns limiting off
    #[serde(default = "default_api_rate_limit")]
    pub api_rate_limit: u32,

    #[serde(default = "default_api_rate_window_secs")]
    pub api_rate_window_secs: u64,
}

/// Deployment stage
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServerConfig {
    /// Resolve `host:port` to the first address the resolver returns.
    ///
    /// IP literals resolve without a lookup; names such as `localhost` go
    /// through the system resolver.
    pub async fn resolve_addr(&self) -> Result<SocketAddr, ValidationError> {
        let invalid = || ValidationError::InvalidHost(format!("{}:{}", self.host, self.port));
        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|_| invalid())?
            .next()
            .ok_or_else(invalid)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Trimmed, non-empty entries of `cors_origins`.
    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .as_ref()
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `None` when `/api/*` is not rate limited.
    pub fn api_rate_limit(&self) -> Option<(u32, Duration)> {
        (self.api_rate_limit > 0).then_some((
            self.api_rate_limit,
            Duration::from_secs(self.api_rate_window_secs),
        ))
    }

    /// Checks that need no network access; name resolution happens at bind time.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if self.host.trim().is_empty() || self.host.contains(char::is_whitespace) {
            return Err(ValidationError::InvalidHost(self.host.clone()));
        }
        if self.api_rate_limit > 0 && self.api_rate_window_secs == 0 {
            return Err(ValidationError::InvalidRateLimitWindow);
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            cors_origins: None,
            api_rate_limit: default_api_rate_limit(),
            api_rate_window_secs: default_api_rate_window_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_environment() -> Environment {
    Environment::Development
}

fn default_log_level() -> String {
    "info,station_relay=debug,tower_http=info".to_string()
}

fn default_api_rate_limit() -> u32 {
    100
}

fn default_api_rate_window_secs() -> u64 {
    15 * 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_all_interfaces_on_3000() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(
            config.api_rate_limit(),
            Some((100, Duration::from_secs(900)))
        );
    }

    #[tokio::test]
    async fn ip_literal_resolves_verbatim() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            ..Default::default()
        };
        let addr = config.resolve_addr().await.unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:8000");
    }

    #[tokio::test]
    async fn localhost_resolves_to_loopback() {
        let config = ServerConfig {
            host: "localhost".to_string(),
            port: 8000,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        let addr = config.resolve_addr().await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn production_stage_is_detected() {
        let mut config = ServerConfig::default();
        assert!(!config.is_production());

        config.environment = Environment::Production;
        assert!(config.is_production());
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        let config = ServerConfig {
            cors_origins: Some("http://localhost:5173, http://localhost:3000,".to_string()),
            ..Default::default()
        };
        let origins = config.cors_origins_list();
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "http://localhost:5173");
        assert_eq!(origins[1], "http://localhost:3000");
    }

    #[test]
    fn zero_rate_limit_turns_limiting_off() {
        let config = ServerConfig {
            api_rate_limit: 0,
            api_rate_window_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.api_rate_limit(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn port_zero_is_rejected() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidPort)));
    }

    #[test]
    fn host_with_whitespace_is_rejected() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidHost(_))
        ));
    }

    #[test]
    fn empty_rate_window_is_rejected() {
        let config = ServerConfig {
            api_rate_window_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidRateLimitWindow)
        ));
    }
}
