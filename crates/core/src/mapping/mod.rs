use serde::{Deserialize, Serialize};

use crate::config::SonificationConfig;

/// Inclusive range of the values a metric takes over the active series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Widens both ends by `padding` of their magnitude so the extremes of
    /// the data do not sit on the edges of the frequency range.
    pub fn padded(self, padding: f64) -> Self {
        Self {
            min: self.min - self.min.abs() * padding,
            max: self.max + self.max.abs() * padding,
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `value` inside the range, clamped to [0, 1].
    ///
    /// A degenerate range maps everything to the midpoint.
    pub fn normalize(&self, value: f64) -> Option<f64> {
        if !value.is_finite() || !self.min.is_finite() || !self.max.is_finite() {
            return None;
        }

        let span = self.span();
        if span.abs() <= f64::EPSILON {
            return Some(0.5);
        }
        Some(((value - self.min) / span).clamp(0.0, 1.0))
    }
}

/// Linear mapping from a data value to an oscillator frequency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyMapping {
    pub min_hz: f64,
    pub max_hz: f64,
    pub padding: f64,
}

impl Default for FrequencyMapping {
    fn default() -> Self {
        Self::from_config(&SonificationConfig::default())
    }
}

impl FrequencyMapping {
    pub fn from_config(config: &SonificationConfig) -> Self {
        Self {
            min_hz: config.min_hz,
            max_hz: config.max_hz,
            padding: config.range_padding,
        }
    }

    pub fn frequency_for(&self, value: f64, range: ValueRange) -> Option<f64> {
        let normalized = range.padded(self.padding).normalize(value)?;
        Some(self.min_hz + normalized * (self.max_hz - self.min_hz))
    }
}
