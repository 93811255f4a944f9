//! Layered settings: built-in defaults, an optional TOML file, then
//! `VITALWATCH_*` environment variables.
//!
//! ```toml
//! environment = "development"
//!
//! [development]
//! api_base_url = "http://127.0.0.1:8000/api"
//! ws_url = "ws://127.0.0.1:8000/ws/datos"
//!
//! [transport]
//! max_retries = 10
//! retry_delay = "3s"
//! ```
//!
//! Nested keys map to variables with a double underscore, e.g.
//! `VITALWATCH_TRANSPORT__RETRY_DELAY=5s`.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration::serde_str;
use crate::transport::RetryPolicy;

/// The two named backend environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentName {
    Development,
    Production,
}

/// URLs for one backend environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Endpoints {
    pub api_base_url: String,
    pub ws_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransportSettings {
    pub max_retries: u32,
    #[serde(deserialize_with = "serde_str::deserialize")]
    pub retry_delay: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistorySettings {
    #[serde(deserialize_with = "serde_str::deserialize")]
    pub refresh: Duration,
    pub rows: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlertSettings {
    #[serde(deserialize_with = "serde_str::deserialize")]
    pub dismiss_after: Duration,
    pub tone: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapSettings {
    pub center_lat: f64,
    pub center_lon: f64,
    pub initial_zoom: u8,
    pub fix_zoom: u8,
}

/// Complete application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub environment: EnvironmentName,
    pub development: Endpoints,
    pub production: Endpoints,
    pub transport: TransportSettings,
    pub history: HistorySettings,
    pub alerts: AlertSettings,
    pub map: MapSettings,
}

impl Settings {
    /// Load defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("environment", "production")?
            .set_default("development.api_base_url", "http://127.0.0.1:8000/api")?
            .set_default("development.ws_url", "ws://127.0.0.1:8000/ws/datos")?
            .set_default(
                "production.api_base_url",
                "https://alextrix-healthconnect.onrender.com/api",
            )?
            .set_default("production.ws_url", "wss://alextrix-healthconnect.onrender.com/ws/datos")?
            .set_default("transport.max_retries", 10)?
            .set_default("transport.retry_delay", "3s")?
            .set_default("history.refresh", "30s")?
            .set_default("history.rows", 10)?
            .set_default("alerts.dismiss_after", "5s")?
            .set_default("alerts.tone", true)?
            .set_default("map.center_lat", -16.3989)?
            .set_default("map.center_lon", -71.537)?
            .set_default("map.initial_zoom", 14)?
            .set_default("map.fix_zoom", 15)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("VITALWATCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Endpoints of the active environment.
    pub fn endpoints(&self) -> &Endpoints {
        match self.environment {
            EnvironmentName::Development => &self.development,
            EnvironmentName::Production => &self.production,
        }
    }

    /// Replace URLs of the active environment.
    pub fn override_endpoints(&mut self, api_base_url: Option<String>, ws_url: Option<String>) {
        let active = match self.environment {
            EnvironmentName::Development => &mut self.development,
            EnvironmentName::Production => &mut self.production,
        };
        if let Some(url) = api_base_url {
            active.api_base_url = url;
        }
        if let Some(url) = ws_url {
            active.ws_url = url;
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.transport.max_retries,
            delay: self.transport.retry_delay,
        }
    }
}
