//! Configuration System using Figment
//!
//! This module provides strongly-typed configuration loading for the instrument.
//! Configuration is loaded from:
//! 1. a TOML file (`config/polscan.toml` unless another path is given)
//! 2. Environment variables (prefixed with POLSCAN_)
//!
//! Every key has a default, so a missing file or an empty table yields the
//! reference bench settings.
//!
//! # Example
//! ```no_run
//! use polscan::config::PolscanConfig;
//!
//! let config = PolscanConfig::load()?;
//! println!("Per-step settle: {} ms", config.timing.step_settle_ms);
//! # Ok::<(), polscan::error::PolscanError>(())
//! ```

use crate::error::{AppResult, PolscanError};
use crate::hardware::capabilities::MAX_INTENSITY;
use crate::scan::ScanRequest;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/polscan.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolscanConfig {
    /// Application settings
    #[serde(default)]
    pub application: ApplicationConfig,
    /// Settle and stabilization delays
    #[serde(default)]
    pub timing: TimingConfig,
    /// Scan defaults and argument parsing policy
    #[serde(default)]
    pub scan: ScanConfig,
    /// Simulated bench parameters
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_name")]
    pub name: String,
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log output format (pretty, compact, json)
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

/// Timing of physical settling, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Wait after each per-step move during a scan
    #[serde(default = "default_step_settle")]
    pub step_settle_ms: u64,
    /// Wait after homing and after the first move of a scan
    #[serde(default = "default_extended_settle")]
    pub extended_settle_ms: u64,
    /// Wait after forcing the light source on before a scan
    #[serde(default = "default_light_stabilize")]
    pub light_stabilize_ms: u64,
}

/// Scan defaults substituted for omitted `run` arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Start angle when `run` has no arguments
    #[serde(default)]
    pub default_start: u16,
    /// End angle when `run` has fewer than two arguments
    #[serde(default = "default_end")]
    pub default_end: u16,
    /// Step when `run` has fewer than three arguments
    #[serde(default = "default_step")]
    pub default_step: u16,
    /// Reject non-numeric `run` arguments instead of reading them as 0
    #[serde(default)]
    pub strict_numeric_args: bool,
}

/// Parameters of the simulated optics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Polarizer angle of minimum transmission, in degrees
    #[serde(default)]
    pub extinction_angle_deg: f64,
    /// Detector reading at full transmission
    #[serde(default = "default_max_intensity")]
    pub max_intensity: u16,
    /// Detector reading in the dark
    #[serde(default = "default_dark_level")]
    pub dark_level: u16,
    /// Peak uniform noise in counts
    #[serde(default = "default_noise")]
    pub noise_amplitude: u16,
}

// Default value functions
fn default_name() -> String {
    "polscan".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

fn default_step_settle() -> u64 {
    50
}

fn default_extended_settle() -> u64 {
    1000
}

fn default_light_stabilize() -> u64 {
    500
}

fn default_end() -> u16 {
    180
}

fn default_step() -> u16 {
    1
}

fn default_max_intensity() -> u16 {
    900
}

fn default_dark_level() -> u16 {
    12
}

fn default_noise() -> u16 {
    3
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            step_settle_ms: default_step_settle(),
            extended_settle_ms: default_extended_settle(),
            light_stabilize_ms: default_light_stabilize(),
        }
    }
}

impl TimingConfig {
    /// Per-step settle delay
    pub fn step_settle(&self) -> Duration {
        Duration::from_millis(self.step_settle_ms)
    }

    /// Settle delay for homing and for the first move of a scan
    pub fn extended_settle(&self) -> Duration {
        Duration::from_millis(self.extended_settle_ms)
    }

    /// Wait after the light source is forced on
    pub fn light_stabilize(&self) -> Duration {
        Duration::from_millis(self.light_stabilize_ms)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            default_start: 0,
            default_end: default_end(),
            default_step: default_step(),
            strict_numeric_args: false,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            extinction_angle_deg: 0.0,
            max_intensity: default_max_intensity(),
            dark_level: default_dark_level(),
            noise_amplitude: default_noise(),
        }
    }
}

impl PolscanConfig {
    /// Load configuration from `config/polscan.toml` and environment variables
    ///
    /// Environment variables can override configuration with prefix POLSCAN_
    /// Example: POLSCAN_TIMING_STEP_SETTLE_MS=20
    pub fn load() -> AppResult<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific file path
    ///
    /// A missing file is not an error: defaults and environment still apply.
    pub fn load_from<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let config: Self = Self::figment(path.as_ref()).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("POLSCAN_").map(|key| {
                // POLSCAN_TIMING_STEP_SETTLE_MS -> timing.step_settle_ms
                let key = key.as_str().to_ascii_lowercase();
                match key.split_once('_') {
                    Some((section, rest))
                        if ["application", "timing", "scan", "simulation"]
                            .contains(&section) =>
                    {
                        format!("{section}.{rest}").into()
                    }
                    _ => key.clone().into(),
                }
            }))
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> AppResult<()> {
        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.to_lowercase().as_str()) {
            return Err(PolscanError::Configuration(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            )));
        }

        let valid_formats = ["pretty", "compact", "json"];
        if !valid_formats.contains(&self.application.log_format.to_lowercase().as_str()) {
            return Err(PolscanError::Configuration(format!(
                "Invalid log_format '{}'. Must be one of: {}",
                self.application.log_format,
                valid_formats.join(", ")
            )));
        }

        // Defaults must themselves form a runnable scan
        ScanRequest::new(
            i64::from(self.scan.default_start),
            i64::from(self.scan.default_end),
            i64::from(self.scan.default_step),
        )
        .map_err(|e| PolscanError::Configuration(format!("Invalid scan defaults: {e}")))?;

        if self.simulation.max_intensity > MAX_INTENSITY {
            return Err(PolscanError::Configuration(format!(
                "Invalid max_intensity {}. Must be 0-{}",
                self.simulation.max_intensity, MAX_INTENSITY
            )));
        }
        if self.simulation.dark_level > self.simulation.max_intensity {
            return Err(PolscanError::Configuration(format!(
                "dark_level {} exceeds max_intensity {}",
                self.simulation.dark_level, self.simulation.max_intensity
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PolscanConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scan.default_end, 180);
        assert_eq!(config.timing.extended_settle(), Duration::from_secs(1));
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = PolscanConfig::default();
        config.application.log_level = "chatty".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = PolscanConfig::default();
        config.application.log_format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_equal_default_angles_rejected() {
        let mut config = PolscanConfig::default();
        config.scan.default_start = 90;
        config.scan.default_end = 90;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid scan defaults"));
    }

    #[test]
    fn test_zero_default_step_rejected() {
        let mut config = PolscanConfig::default();
        config.scan.default_step = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_simulation_must_fit_detector() {
        let mut config = PolscanConfig::default();
        config.simulation.max_intensity = 4095;
        assert!(config.validate().is_err());

        let mut config = PolscanConfig::default();
        config.simulation.dark_level = config.simulation.max_intensity + 1;
        assert!(config.validate().is_err());
    }
}
