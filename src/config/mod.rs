//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `STATION_RELAY` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use station_relay::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.port);
//! ```

mod error;
mod server;
mod station;

pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};
pub use station::{StationConfig, MAX_OUTBOUND_BUFFER};

use serde::Deserialize;

/// Unprefixed variables honoured as fallbacks, mapped to their config keys.
const PLATFORM_FALLBACKS: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("HOST", "server.host"),
    ("ALLOWED_ORIGINS", "server.cors_origins"),
];

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// development server. Load using [`AppConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging, CORS, API rate limit)
    #[serde(default)]
    pub server: ServerConfig,

    /// Station behaviour (admission policy, relay modes, heartbeat, idle track)
    #[serde(default)]
    pub station: StationConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Seeds defaults from the plain `PORT`, `HOST` and `ALLOWED_ORIGINS`
    ///    variables that hosting platforms set
    /// 3. Reads environment variables with `STATION_RELAY` prefix, which win
    ///    over the plain ones
    /// 4. Uses `__` (double underscore) to separate nested values
    /// 5. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `STATION_RELAY__SERVER__PORT=3000` -> `server.port = 3000`
    /// - `PORT=8080` -> `server.port = 8080` unless the prefixed form is set
    /// - `STATION_RELAY__STATION__ADMISSION_POLICY=replace` -> `station.admission_policy = replace`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        for (var, key) in PLATFORM_FALLBACKS {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_default(*key, value)?;
            }
        }

        let config = builder
            .add_source(
                config::Environment::default()
                    .prefix("STATION_RELAY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.station.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
