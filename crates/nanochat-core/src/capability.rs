//! One-time capability probe.

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{ChatError, HostError};
use crate::host::ModelHost;
use crate::session::SessionConfig;

/// Default generation parameters reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Capability {
    pub default_temperature: f64,
    pub default_top_k: u32,
}

impl Capability {
    pub fn default_config(&self) -> SessionConfig {
        SessionConfig {
            temperature: self.default_temperature,
            top_k: self.default_top_k,
        }
    }
}

/// Query the host for its defaults.
///
/// An absent capability is `ChatError::Unsupported`. Any other host failure
/// while probing is reported as an initialization failure.
pub async fn probe(host: &dyn ModelHost) -> Result<Capability, ChatError> {
    match host.probe().await {
        Ok(capability) => {
            info!(
                temperature = capability.default_temperature,
                top_k = capability.default_top_k,
                "model capability available"
            );
            Ok(capability)
        }
        Err(HostError::Unsupported) => {
            warn!("host does not expose a language model");
            Err(ChatError::Unsupported)
        }
        Err(e) => Err(ChatError::Initialization(e.to_string())),
    }
}
