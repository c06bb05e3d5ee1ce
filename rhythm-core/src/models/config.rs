use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// Samples per analysis window.
pub const DEFAULT_WINDOW_SIZE: usize = 1024;

/// Number of energy bands published per frame.
pub const DEFAULT_BAND_COUNT: usize = 16;

/// Calibration applied to each band mean before clamping to `[0, 1]`.
pub const DEFAULT_GAIN: f32 = 10.0;

/// Pause between publish ticks (~60 frames per second).
pub const DEFAULT_PUBLISH_INTERVAL_MS: u64 = 16;

/// Configuration for a spectrum analyzer.
///
/// Fixed for the lifetime of the analyzer it is handed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Analysis window length in mono samples. Must be a power of two.
    pub window_size: usize,

    /// Number of contiguous bands the lower half-spectrum is split into.
    pub band_count: usize,

    /// Multiplier applied to each band's mean magnitude.
    pub gain: f32,

    /// Sleep between capture loop iterations, in milliseconds.
    pub publish_interval_ms: u64,
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.window_size < 2 || !self.window_size.is_power_of_two() {
            return Err(format!("window size must be a power of two, got {}", self.window_size));
        }
        if self.band_count == 0 {
            return Err("band count must be positive".into());
        }
        let usable_bins = self.window_size / 2;
        if self.band_count > usable_bins || usable_bins % self.band_count != 0 {
            return Err(format!(
                "band count {} does not evenly split {} usable bins",
                self.band_count, usable_bins
            ));
        }
        if !self.gain.is_finite() || self.gain <= 0.0 {
            return Err(format!("gain must be finite and positive, got {}", self.gain));
        }
        if self.publish_interval_ms == 0 {
            return Err("publish interval must be at least 1 ms".into());
        }
        Ok(())
    }

    /// Parse a JSON configuration document and validate it.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, CaptureError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CaptureError::ConfigurationFailed(format!("invalid config json: {}", e)))?;
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        Ok(config)
    }

    pub fn publish_interval(&self) -> Duration {
        Duration::from_millis(self.publish_interval_ms)
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            band_count: DEFAULT_BAND_COUNT,
            gain: DEFAULT_GAIN,
            publish_interval_ms: DEFAULT_PUBLISH_INTERVAL_MS,
        }
    }
}
