//! Error kinds for the chat core.
//!
//! `HostError` is what a host implementation reports. It is converted into a
//! `ChatError` at the controller or aggregator boundary, so the orchestrator
//! never sees a raw host failure.

use crate::transcript::TranscriptError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("the Prompt API is not available in this environment")]
    Unsupported,
    #[error("session has been destroyed")]
    SessionDestroyed,
    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// Host capability absent. Fatal for the rest of the run.
    #[error("this environment doesn't support the Prompt API")]
    Unsupported,
    /// Capability present but the session could not be created.
    #[error("Failed to initialize: {0}")]
    Initialization(String),
    /// Reconfiguration failed; the previous session is still live.
    #[error("Failed to update session: {0}")]
    Configuration(String),
    /// Streaming failed mid-prompt.
    #[error("{0}")]
    Generation(String),
    #[error("a prompt is already in flight")]
    Busy,
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("no live session")]
    NoSession,
    #[error("transcript invariant violated: {0}")]
    Invariant(#[from] TranscriptError),
}

impl ChatError {
    /// Whether the chat surface is unusable for the rest of the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ChatError::Unsupported)
    }
}
