//! Daemon settings: fixed defaults, optionally overridden by a JSON file
//! under the platform configuration directory. No command-line flags, no
//! environment variables.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tunable endpoints and cadence. Bus protocol constants are not
/// configurable; they live in `thermopipe_decode::protocol`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// I2C controller device file.
    pub device: String,
    /// Named pipe consumers read from.
    pub pipe: String,
    /// Directory the rotating log files land in.
    pub log_dir: String,
    /// Identifier prefixed to every published line.
    pub sensor_id: String,
    /// Sensor warm-up before the first transaction, in milliseconds.
    pub warmup_ms: u64,
    /// Delay between acquisition cycles, in milliseconds.
    pub cycle_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: "/dev/i2c-0".to_string(),
            pipe: "/tmp/sensor_data_pipe".to_string(),
            log_dir: "logs".to_string(),
            sensor_id: "sensor_1".to_string(),
            warmup_ms: 620,
            cycle_ms: 300,
        }
    }
}

impl Config {
    /// `thermopipe/config.json` under the platform configuration directory.
    fn file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("thermopipe").join("config.json"))
    }

    /// Defaults, overridden by the settings file when one exists. A file
    /// that exists but does not parse is a startup error.
    pub fn load() -> Result<Self> {
        let Some(path) = Self::file_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_fixed_endpoints() {
        let config = Config::default();
        assert_eq!(config.device, "/dev/i2c-0");
        assert_eq!(config.pipe, "/tmp/sensor_data_pipe");
        assert_eq!(config.sensor_id, "sensor_1");
        assert_eq!(config.warmup_ms, 620);
        assert_eq!(config.cycle_ms, 300);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config: Config = serde_json::from_str(r#"{"device": "/dev/i2c-1"}"#).unwrap();
        assert_eq!(config.device, "/dev/i2c-1");
        assert_eq!(config.pipe, "/tmp/sensor_data_pipe");
        assert_eq!(config.cycle_ms, 300);
    }

    #[test]
    fn settings_round_trip() {
        let mut config = Config::default();
        config.sensor_id = "sensor_7".to_string();
        let text = serde_json::to_string(&config).unwrap();
        let reloaded: Config = serde_json::from_str(&text).unwrap();
        assert_eq!(reloaded.sensor_id, "sensor_7");
        assert_eq!(reloaded.device, config.device);
    }
}
