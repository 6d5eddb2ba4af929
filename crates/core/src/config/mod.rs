use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Top-level configuration structure for the application.
///
/// Every field has a default so partial JSON files are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub playback: PlaybackConfig,
    pub skip: SkipConfig,
    pub sonification: SonificationConfig,
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

/// Timing of the playback tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Wall-clock period between two playback ticks.
    pub tick_ms: u64,
    /// Wall-clock seconds a full pass over any dataset takes at speed 1.0.
    pub standardized_seconds: f64,
    pub default_speed: f64,
}

impl PlaybackConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            standardized_seconds: 20.0,
            default_speed: 1.0,
        }
    }
}

/// Discrete and press-and-hold skip behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkipConfig {
    /// Percentage of the total duration jumped by a single press.
    pub step_percent: f64,
    pub hold_delay_ms: u64,
    pub repeat_ms: u64,
    /// Percentage jumped per repeat while holding, before acceleration.
    pub hold_step_percent: f64,
    /// Growth of the skip multiplier per second of holding.
    pub acceleration: f64,
    pub max_speed: f64,
}

impl SkipConfig {
    pub fn hold_delay(&self) -> Duration {
        Duration::from_millis(self.hold_delay_ms)
    }

    pub fn repeat_period(&self) -> Duration {
        Duration::from_millis(self.repeat_ms.max(1))
    }
}

impl Default for SkipConfig {
    fn default() -> Self {
        Self {
            step_percent: 5.0,
            hold_delay_ms: 500,
            repeat_ms: 50,
            hold_step_percent: 0.5,
            acceleration: 4.0,
            max_speed: 10.0,
        }
    }
}

/// Mapping of data values onto the oscillator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SonificationConfig {
    pub min_hz: f64,
    pub max_hz: f64,
    /// Fraction of |min| and |max| added around the data range.
    pub range_padding: f64,
    /// Smoothing time constant, in seconds, for frequency changes.
    pub time_constant: f64,
    pub volume: f64,
    pub sample_rate: u32,
}

impl Default for SonificationConfig {
    fn default() -> Self {
        Self {
            min_hz: 100.0,
            max_hz: 1500.0,
            range_padding: 0.1,
            time_constant: 0.1,
            volume: 0.5,
            sample_rate: 48_000,
        }
    }
}
