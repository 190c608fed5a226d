//! Rune configuration system
//!
//! This crate provides centralized configuration management for Rune,
//! loading settings from `rune.toml` with environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Rune
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RuneConfig {
    /// Shared-element transition settings
    pub motion: MotionConfig,
}

/// Shared-element transition configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// How long an unclaimed snapshot survives after its owner unmounts
    pub eviction_grace_ms: u64,
    /// Default effect duration: "dynamic" or a number of milliseconds
    pub default_duration: String,
    /// Default CSS easing descriptor for effects
    pub timing_function: String,
    /// Show an element right away when nothing is waiting to animate into it
    pub visible_when_announced: bool,
    /// Length of closing fade-outs in milliseconds
    pub settle_delay_ms: u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            eviction_grace_ms: 50,
            default_duration: "dynamic".to_string(),
            timing_function: "cubic-bezier(0.4, 0, 0.2, 1)".to_string(),
            visible_when_announced: true,
            settle_delay_ms: 100,
        }
    }
}

fn parse_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl RuneConfig {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the rune.toml configuration file
    ///
    /// # Returns
    /// * `Ok(RuneConfig)` - Successfully loaded configuration
    /// * `Err(String)` - Error message if loading failed
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Load configuration from the default location (rune.toml in the current directory)
    /// or return default configuration if file doesn't exist
    pub fn load_or_default() -> Self {
        Self::load_from_file("rune.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    /// Values that fail to parse are ignored.
    pub fn merge_with_env(&mut self) {
        if let Ok(val) = std::env::var("RUNE_MOTION_EVICTION_MS") {
            if let Ok(ms) = val.parse::<u64>() {
                self.motion.eviction_grace_ms = ms;
            }
        }
        if let Ok(duration) = std::env::var("RUNE_MOTION_DURATION") {
            self.motion.default_duration = duration;
        }
        if let Ok(timing) = std::env::var("RUNE_MOTION_TIMING") {
            self.motion.timing_function = timing;
        }
        if let Ok(val) = std::env::var("RUNE_MOTION_VISIBLE") {
            self.motion.visible_when_announced = parse_flag(&val);
        }
        if let Ok(val) = std::env::var("RUNE_MOTION_SETTLE_MS") {
            if let Ok(ms) = val.parse::<u64>() {
                self.motion.settle_delay_ms = ms;
            }
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// This is the recommended way to load configuration:
    /// 1. Load from rune.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}
