//! Sampling configuration bound to a session at creation time.

use serde::{Deserialize, Serialize};

use crate::error::ChatError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// In `[0, 1]`.
    pub temperature: f64,
    /// At least 1.
    pub top_k: u32,
}

impl SessionConfig {
    pub fn new(temperature: f64, top_k: u32) -> Self {
        Self { temperature, top_k }
    }

    pub fn with_temperature(self, temperature: f64) -> Self {
        Self {
            temperature,
            ..self
        }
    }

    pub fn with_top_k(self, top_k: u32) -> Self {
        Self { top_k, ..self }
    }

    /// Reject values the host would refuse, before the host is called.
    pub fn validate(&self) -> Result<(), ChatError> {
        if !self.temperature.is_finite() || !(0.0..=1.0).contains(&self.temperature) {
            return Err(ChatError::Configuration(format!(
                "temperature {} is outside [0, 1]",
                self.temperature
            )));
        }
        if self.top_k == 0 {
            return Err(ChatError::Configuration("topK must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds() {
        assert!(SessionConfig::new(0.0, 1).validate().is_ok());
        assert!(SessionConfig::new(1.0, 40).validate().is_ok());
    }

    #[test]
    fn rejects_temperature_out_of_range() {
        let err = SessionConfig::new(1.2, 3).validate().unwrap_err();
        assert!(matches!(err, ChatError::Configuration(msg) if msg.contains("temperature")));
        assert!(SessionConfig::new(f64::NAN, 3).validate().is_err());
        assert!(SessionConfig::new(-0.1, 3).validate().is_err());
    }

    #[test]
    fn rejects_zero_top_k() {
        let err = SessionConfig::new(0.5, 0).validate().unwrap_err();
        assert!(matches!(err, ChatError::Configuration(msg) if msg.contains("topK")));
    }

    #[test]
    fn with_helpers_change_one_parameter() {
        let base = SessionConfig::new(0.8, 3);
        assert_eq!(base.with_temperature(0.2), SessionConfig::new(0.2, 3));
        assert_eq!(base.with_top_k(10), SessionConfig::new(0.8, 10));
    }
}
