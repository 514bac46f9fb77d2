//! Configuration schema types for nanochat.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with the defaults the chat surface ships with.

mod chat;
mod host;
mod sampling;
mod system;

pub use chat::*;
pub use host::*;
pub use sampling::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for nanochat.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct NanochatConfig {
    pub chat: ChatConfig,
    pub sampling: SamplingConfig,
    pub host: HostConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Tests
// =============================================================================
