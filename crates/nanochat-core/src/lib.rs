//! Chat core for an on-device language model exposed by a host runtime.
//!
//! Provides:
//! - A host boundary (`ModelHost` / `HostSession`) plus a simulated host
//! - Capability probing and single-session lifecycle management
//! - Aggregation of streamed chunks into a stable answer
//! - A transcript with one in-progress assistant slot
//! - An `Idle`/`Sending` orchestrator that owns all chat state

pub mod capability;
pub mod chat;
pub mod error;
pub mod host;
pub mod session;
pub mod stats;
pub mod streaming;
pub mod transcript;

pub use capability::Capability;
pub use chat::{view_to_json, ChatOrchestrator, ChatPhase, ChatSettings, ChatState, ChatView};
pub use error::{ChatError, HostError};
pub use host::simulated::{Reply, SimulatedHost};
pub use host::{ChunkStream, HostSession, ModelHost};
pub use session::{SessionConfig, SessionController};
pub use stats::Stats;
pub use streaming::{AggregateUpdate, ChunkMode, PromptStream, StreamAggregator, StreamStatus};
pub use transcript::{Transcript, TranscriptError, Turn};

/// Author of a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}
