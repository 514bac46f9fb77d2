//! Bounds for the temperature and top-K controls.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Temperature granularity (valid range: 0.01-1.0).
    pub temperature_step: f64,
    pub top_k_min: u32,
    pub top_k_max: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature_step: 0.1,
            top_k_min: 1,
            top_k_max: 40,
        }
    }
}

impl SamplingConfig {
    /// Clamp a temperature into `[0, 1]` and snap it to the step grid. The
    /// result never exceeds 1.0, even when the step does not divide it.
    pub fn snap_temperature(&self, value: f64) -> f64 {
        let clamped = if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if self.temperature_step <= 0.0 {
            return clamped;
        }
        let max_steps = (1.0 / self.temperature_step + 1e-9).floor();
        let steps = (clamped / self.temperature_step).round().min(max_steps);
        // Round away float noise such as 0.30000000000000004.
        ((steps * self.temperature_step) * 1000.0).round() / 1000.0
    }

    pub fn clamp_top_k(&self, value: u32) -> u32 {
        value.clamp(self.top_k_min, self.top_k_max.max(self.top_k_min))
    }
}
