//! # Emulator Configuration
//!
//! ```toml
//! [emulator]
//! tick_hz = 4
//! title = "GoodWatch"
//! alt_screen = true
//!
//! [keys]
//! quit = "q"
//! switch_app = "m"
//!
//! [device]
//! has_radio = false
//! has_side_button = false
//! ```
//!
//! Every section and key is optional. Command-line flags override the file.

// src/config.rs - Single configuration file
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bridge::KeyBindings;
use crate::hardware::Capabilities;

/// Fastest watchdog cadence the firmware is written for.
pub const MAX_TICK_HZ: u32 = 4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub emulator: EmulatorConfig,
    #[serde(default)]
    pub keys: KeyBindings,
    #[serde(default)]
    pub device: Capabilities,
}

/// Host-side presentation and cadence.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EmulatorConfig {
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_alt_screen")]
    pub alt_screen: bool,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            tick_hz: default_tick_hz(),
            title: default_title(),
            alt_screen: default_alt_screen(),
        }
    }
}

impl EmulatorConfig {
    pub fn tick_period(&self) -> Duration {
        tick_period(self.tick_hz)
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_TICK_HZ).contains(&self.emulator.tick_hz) {
            return Err(ConfigError::Invalid(format!(
                "tick_hz must be between 1 and {}, got {}",
                MAX_TICK_HZ, self.emulator.tick_hz
            )));
        }
        if self.keys.quit == self.keys.switch_app {
            return Err(ConfigError::Invalid(format!(
                "quit and switch_app are both bound to {:?}",
                self.keys.quit
            )));
        }
        for (name, key) in [("quit", self.keys.quit), ("switch_app", self.keys.switch_app)] {
            if key.is_control() || key.is_whitespace() {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a printable key, got {key:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Interval between watchdog ticks at `hz`, clamped to the supported range.
pub fn tick_period(hz: u32) -> Duration {
    Duration::from_millis(1000 / u64::from(hz.clamp(1, MAX_TICK_HZ)))
}

fn default_tick_hz() -> u32 {
    1
}
fn default_title() -> String {
    "GoodWatch".to_string()
}
fn default_alt_screen() -> bool {
    true
}

pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let config: Config = match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to parse config TOML: {}", e);
                return Err(ConfigError::Toml(e));
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file '{}': {}", path, e);
            return Err(ConfigError::Io(e));
        }
    };
    config.validate().inspect_err(|e| {
        tracing::error!("Rejected config '{}': {}", path, e);
    })?;
    Ok(config)
}
