use crate::error::{CradleError, Result};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Supervisor configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CradleConfig {
    /// Delay between a dependency's recovery and a dependent's own
    /// automatic restart attempt, in milliseconds
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,

    /// Emit debug logging for every published lifecycle event
    #[serde(default = "default_debug_events")]
    pub debug_events: bool,
}

fn default_restart_delay_ms() -> u64 {
    500
}

fn default_debug_events() -> bool {
    false
}

impl Default for CradleConfig {
    fn default() -> Self {
        Self {
            restart_delay_ms: default_restart_delay_ms(),
            debug_events: default_debug_events(),
        }
    }
}

impl CradleConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from_file("cradle.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("restart_delay_ms", default_restart_delay_ms())?
            .set_default("debug_events", default_debug_events())?
            .add_source(File::with_name(&path_str).required(false))
            .add_source(Environment::with_prefix("CRADLE"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.restart_delay_ms == 0 {
            return Err(CradleError::invalid_config(
                "restart_delay_ms must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    /// Serialize the configuration to TOML, for `--print-config`.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
