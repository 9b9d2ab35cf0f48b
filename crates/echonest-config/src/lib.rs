// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use echonest_client::client::{DEFAULT_BASE_PATH, DEFAULT_HOSTNAME, DEFAULT_SCHEME};
use echonest_client::{EchoNestClientBuilder, MinuteAligned};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub hostname: String,
    pub base_path: String,
    pub scheme: String,
    /// Falls back to `ECHO_NEST_API_KEY` when unset.
    pub api_key: Option<String>,
    pub throttle: bool,
    pub timeout_secs: u64,
    /// Length of the rate-limit window, aligned to wall-clock boundaries.
    pub window_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            scheme: DEFAULT_SCHEME.to_string(),
            api_key: None,
            throttle: false,
            timeout_secs: 30,
            window_secs: 60,
        }
    }
}

impl ClientConfig {
    /// Client builder preloaded with these settings.
    pub fn builder(&self) -> EchoNestClientBuilder {
        let mut builder = EchoNestClientBuilder::default()
            .scheme(self.scheme.clone())
            .hostname(self.hostname.clone())
            .base_path(self.base_path.clone())
            .throttle(self.throttle)
            .timeout(Duration::from_secs(self.timeout_secs))
            .reset_window(Arc::new(MinuteAligned::new(Duration::from_secs(
                self.window_secs,
            ))));
        if let Some(api_key) = &self.api_key {
            builder = builder.api_key(api_key.clone());
        }
        builder
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub telemetry: TelemetryConfig,
}

/// Load configuration from defaults, optional TOML file, and environment overrides (prefix: ECHONEST_).
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        debug!(target: "config", path = %path.display(), "merging config file");
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("ECHONEST_").split("__"));

    let config: AppConfig = figment.extract()?;
    info!(
        target: "config",
        hostname = %config.client.hostname,
        throttle = config.client.throttle,
        "configuration loaded"
    );
    Ok(config)
}
