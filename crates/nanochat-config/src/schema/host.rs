//! Settings for the in-process simulated model host used by the terminal
//! front end.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// When false the host reports the language model API as unsupported.
    pub available: bool,
    pub default_temperature: f64,
    pub default_top_k: u32,
    /// Context size of each session, in tokens.
    pub max_tokens: u64,
    /// Pause between streamed chunks in milliseconds (valid range: 0-5000).
    pub chunk_delay_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            available: true,
            default_temperature: 0.8,
            default_top_k: 3,
            max_tokens: 6144,
            chunk_delay_ms: 40,
        }
    }
}
