//! Boundary to the host runtime that executes the model.
//!
//! Sampling parameters are fixed when a session is created, so changing
//! them always means creating a new session.

pub mod simulated;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;
use nanochat_common::SessionId;

use crate::capability::Capability;
use crate::error::HostError;
use crate::session::SessionConfig;

/// Owned stream of chunks for one prompt.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, HostError>> + Send>>;

#[async_trait]
pub trait ModelHost: Send + Sync {
    /// Default sampling parameters, or `HostError::Unsupported`.
    async fn probe(&self) -> Result<Capability, HostError>;

    async fn create_session(
        &self,
        config: SessionConfig,
    ) -> Result<Box<dyn HostSession>, HostError>;
}

/// A host-managed generation context bound to one `SessionConfig`.
///
/// The token counters are maintained by the host; readers mirror them and
/// never recompute them.
#[async_trait]
pub trait HostSession: Send + Sync {
    fn id(&self) -> &SessionId;

    fn config(&self) -> SessionConfig;

    fn max_tokens(&self) -> u64;

    fn tokens_so_far(&self) -> u64;

    fn tokens_left(&self) -> u64;

    /// Start generating a reply. The returned stream outlives the borrow.
    async fn prompt_streaming(&self, prompt: &str) -> Result<ChunkStream, HostError>;

    /// Release the host resource. Calling it twice is a no-op.
    async fn destroy(&self);
}
