//! Service configuration
//!
//! Settings are layered with figment: built-in defaults, then an optional
//! TOML file, then the process environment. A `.env` file in the working
//! directory is read into the environment first; variables already set win.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::error::{AppError, Result};

/// Default configuration file, resolved relative to the working directory
const CONFIG_FILE_NAME: &str = "nuvelu.toml";

/// Environment variable pointing at an alternative configuration file
const CONFIG_PATH_VAR: &str = "NUVELU_CONFIG";

/// Environment variables read into the settings
const ENV_KEYS: &[&str] = &[
    "database_path",
    "jwt_secret_key",
    "jwt_expiration_seconds",
    "bind_address",
    "port",
    "cors_max_age_seconds",
];

/// Runtime settings for the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Shared secret for HS256 token signing
    pub jwt_secret_key: String,
    /// Token lifetime in seconds
    pub jwt_expiration_seconds: u64,
    /// Interface the HTTP server binds to
    pub bind_address: String,
    /// Port the HTTP server listens on
    pub port: u16,
    /// How long browsers may cache CORS preflight responses
    pub cors_max_age_seconds: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("nuvelu.db"),
            jwt_secret_key: String::new(),
            jwt_expiration_seconds: 3600,
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            cors_max_age_seconds: 3600,
        }
    }
}

impl Settings {
    /// Load settings from defaults, the config file and the environment
    ///
    /// A file named by `NUVELU_CONFIG` must exist. The default `nuvelu.toml`
    /// is optional.
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }

        let config_file = match env::var(CONFIG_PATH_VAR) {
            Ok(path) => {
                let path = PathBuf::from(path);
                if !path.is_file() {
                    return Err(AppError::ConfigValidation(format!(
                        "{} points at {}, which does not exist",
                        CONFIG_PATH_VAR,
                        path.display()
                    )));
                }
                path
            }
            Err(_) => PathBuf::from(CONFIG_FILE_NAME),
        };
        debug!("Reading configuration from {}", config_file.display());

        Self::from_figment(
            Figment::new()
                .merge(Serialized::defaults(Settings::default()))
                .merge(Toml::file(config_file))
                .merge(Env::raw().only(ENV_KEYS)),
        )
    }

    /// Extract and validate settings from a prepared figment
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let settings: Settings = figment.extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that the settings can run a server
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret_key.trim().is_empty() {
            return Err(AppError::ConfigValidation(
                "JWT_SECRET_KEY must be set".to_string(),
            ));
        }

        if self.jwt_expiration_seconds == 0 {
            return Err(AppError::ConfigValidation(
                "JWT_EXPIRATION_SECONDS must be greater than 0".to_string(),
            ));
        }

        if self.port == 0 {
            return Err(AppError::ConfigValidation(
                "PORT must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Address string for binding the HTTP server
    pub fn bind_target(&self) -> (String, u16) {
        (self.bind_address.clone(), self.port)
    }

    /// Token lifetime as a Duration
    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_seconds)
    }
}
