//! Chat surface configuration: greetings, stream handling, notices.

use serde::{Deserialize, Serialize};

/// How the host's streamed chunks relate to each other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum ChunkMode {
    /// Every chunk is the whole answer so far.
    #[default]
    Cumulative,
    /// Every chunk is only the newly generated text.
    Delta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Assistant turn shown after a successful start.
    pub welcome_message: String,
    /// Assistant turn shown after the chat is cleared.
    pub cleared_message: String,
    pub chunk_mode: ChunkMode,
    /// Maximum number of inline notices kept (valid range: 1-64).
    pub notice_capacity: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            welcome_message: "Hello! I'm Gemini Nano. How can I help you today?".into(),
            cleared_message: "Chat cleared. How can I help you?".into(),
            chunk_mode: ChunkMode::Cumulative,
            notice_capacity: 8,
        }
    }
}
