//! In-process host with scripted replies.
//!
//! Backs the terminal front end and the tests. Unscripted prompts get an
//! echo reply streamed word by word. Tokens are counted as whitespace
//! separated words and clamped to the session's context size, so
//! `tokens_so_far + tokens_left == max_tokens` always holds.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream;
use nanochat_common::SessionId;
use tracing::debug;

use crate::capability::Capability;
use crate::error::HostError;
use crate::host::{ChunkStream, HostSession, ModelHost};
use crate::session::SessionConfig;
use crate::streaming::ChunkMode;

/// Scripted outcome for the next prompt.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Emit these chunks, then end normally.
    Chunks(Vec<String>),
    /// Emit these chunks, then fail with the message.
    FailAfter(Vec<String>, String),
    /// Refuse to start streaming.
    FailToStart(String),
}

impl Reply {
    pub fn chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Reply::Chunks(chunks.into_iter().map(Into::into).collect())
    }

    pub fn fail_after<I, S>(chunks: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Reply::FailAfter(chunks.into_iter().map(Into::into).collect(), message.into())
    }
}

#[derive(Default)]
struct Shared {
    replies: Mutex<VecDeque<Reply>>,
    create_failures: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    live: AtomicUsize,
    created: AtomicUsize,
}

pub struct SimulatedHost {
    capability: Option<Capability>,
    max_tokens: u64,
    chunk_delay: Option<Duration>,
    chunk_mode: ChunkMode,
    shared: Arc<Shared>,
}

impl SimulatedHost {
    pub fn new(default_temperature: f64, default_top_k: u32) -> Self {
        Self {
            capability: Some(Capability {
                default_temperature,
                default_top_k,
            }),
            max_tokens: 6144,
            chunk_delay: None,
            chunk_mode: ChunkMode::Cumulative,
            shared: Arc::new(Shared::default()),
        }
    }

    /// A host without the language model API.
    pub fn unavailable() -> Self {
        Self {
            capability: None,
            ..Self::new(0.0, 1)
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = (!delay.is_zero()).then_some(delay);
        self
    }

    /// Whether unscripted replies stream as snapshots or as deltas.
    pub fn with_chunk_mode(mut self, mode: ChunkMode) -> Self {
        self.chunk_mode = mode;
        self
    }

    /// Queue the outcome of a future prompt (first in, first out).
    pub fn push_reply(&self, reply: Reply) {
        if let Ok(mut replies) = self.shared.replies.lock() {
            replies.push_back(reply);
        }
    }

    /// Make the next `create_session` call fail with `message`.
    pub fn fail_next_create(&self, message: impl Into<String>) {
        if let Ok(mut failures) = self.shared.create_failures.lock() {
            failures.push_back(message.into());
        }
    }

    /// Sessions created and not yet destroyed.
    pub fn live_sessions(&self) -> usize {
        self.shared.live.load(Ordering::Acquire)
    }

    pub fn sessions_created(&self) -> usize {
        self.shared.created.load(Ordering::Acquire)
    }

    /// Every prompt received so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.shared
            .prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ModelHost for SimulatedHost {
    async fn probe(&self) -> Result<Capability, HostError> {
        self.capability.ok_or(HostError::Unsupported)
    }

    async fn create_session(
        &self,
        config: SessionConfig,
    ) -> Result<Box<dyn HostSession>, HostError> {
        if self.capability.is_none() {
            return Err(HostError::Unsupported);
        }
        let injected = self
            .shared
            .create_failures
            .lock()
            .ok()
            .and_then(|mut f| f.pop_front());
        if let Some(message) = injected {
            return Err(HostError::Failed(message));
        }
        if config.top_k == 0 {
            return Err(HostError::Failed("topK must be positive".into()));
        }

        self.shared.created.fetch_add(1, Ordering::AcqRel);
        self.shared.live.fetch_add(1, Ordering::AcqRel);
        let session = SimulatedSession {
            id: SessionId::new(),
            config,
            max_tokens: self.max_tokens,
            chunk_delay: self.chunk_delay,
            chunk_mode: self.chunk_mode,
            tokens_so_far: Arc::new(AtomicU64::new(0)),
            destroyed: Arc::new(AtomicBool::new(false)),
            shared: Arc::clone(&self.shared),
        };
        debug!(session = %session.id, "simulated session created");
        Ok(Box::new(session))
    }
}

struct SimulatedSession {
    id: SessionId,
    config: SessionConfig,
    max_tokens: u64,
    chunk_delay: Option<Duration>,
    chunk_mode: ChunkMode,
    tokens_so_far: Arc<AtomicU64>,
    destroyed: Arc<AtomicBool>,
    shared: Arc<Shared>,
}

impl SimulatedSession {
    fn next_reply(&self, prompt: &str) -> Reply {
        let scripted = self
            .shared
            .replies
            .lock()
            .ok()
            .and_then(|mut r| r.pop_front());
        scripted.unwrap_or_else(|| Reply::Chunks(echo_chunks(prompt, self.chunk_mode)))
    }
}

#[async_trait]
impl HostSession for SimulatedSession {
    fn id(&self) -> &SessionId {
        &self.id
    }

    fn config(&self) -> SessionConfig {
        self.config
    }

    fn max_tokens(&self) -> u64 {
        self.max_tokens
    }

    fn tokens_so_far(&self) -> u64 {
        self.tokens_so_far.load(Ordering::Acquire)
    }

    fn tokens_left(&self) -> u64 {
        self.max_tokens.saturating_sub(self.tokens_so_far())
    }

    async fn prompt_streaming(&self, prompt: &str) -> Result<ChunkStream, HostError> {
        if self.destroyed.load(Ordering::Acquire) {
            return Err(HostError::SessionDestroyed);
        }
        if let Ok(mut prompts) = self.shared.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let (chunks, failure) = match self.next_reply(prompt) {
            Reply::FailToStart(message) => return Err(HostError::Failed(message)),
            Reply::Chunks(chunks) => (chunks, None),
            Reply::FailAfter(chunks, message) => (chunks, Some(message)),
        };

        let base = (self.tokens_so_far() + word_count(prompt)).min(self.max_tokens);
        self.tokens_so_far.store(base, Ordering::Release);

        let replay = Replay {
            chunks: chunks.into(),
            failure,
            delay: self.chunk_delay,
            mode: self.chunk_mode,
            destroyed: Arc::clone(&self.destroyed),
            tokens_so_far: Arc::clone(&self.tokens_so_far),
            base,
            max_tokens: self.max_tokens,
            reply_words: 0,
            finished: false,
        };
        Ok(Box::pin(stream::unfold(replay, |mut replay| async move {
            let item = replay.step().await?;
            Some((item, replay))
        })))
    }

    async fn destroy(&self) {
        if !self.destroyed.swap(true, Ordering::AcqRel) {
            self.shared.live.fetch_sub(1, Ordering::AcqRel);
            debug!(session = %self.id, "simulated session destroyed");
        }
    }
}

/// Playback state for one prompt's stream.
struct Replay {
    chunks: VecDeque<String>,
    failure: Option<String>,
    delay: Option<Duration>,
    mode: ChunkMode,
    destroyed: Arc<AtomicBool>,
    tokens_so_far: Arc<AtomicU64>,
    base: u64,
    max_tokens: u64,
    reply_words: u64,
    finished: bool,
}

impl Replay {
    async fn step(&mut self) -> Option<Result<String, HostError>> {
        if self.finished {
            return None;
        }
        if self.chunks.is_empty() && self.failure.is_none() {
            return None;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.destroyed.load(Ordering::Acquire) {
            self.finished = true;
            return Some(Err(HostError::SessionDestroyed));
        }
        match self.chunks.pop_front() {
            Some(chunk) => {
                self.account(&chunk);
                Some(Ok(chunk))
            }
            None => {
                self.finished = true;
                self.failure.take().map(|m| Err(HostError::Failed(m)))
            }
        }
    }

    fn account(&mut self, chunk: &str) {
        self.reply_words = match self.mode {
            ChunkMode::Cumulative => word_count(chunk),
            ChunkMode::Delta => self.reply_words + word_count(chunk),
        };
        let used = (self.base + self.reply_words).min(self.max_tokens);
        self.tokens_so_far.store(used, Ordering::Release);
    }
}

fn word_count(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

fn echo_chunks(prompt: &str, mode: ChunkMode) -> Vec<String> {
    let reply = format!("You said: {}", prompt.trim());
    let words: Vec<&str> = reply.split_whitespace().collect();
    match mode {
        ChunkMode::Cumulative => (1..=words.len()).map(|n| words[..n].join(" ")).collect(),
        ChunkMode::Delta => words
            .iter()
            .enumerate()
            .map(|(i, w)| if i == 0 { w.to_string() } else { format!(" {w}") })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    async fn collect(stream: ChunkStream) -> Vec<Result<String, HostError>> {
        stream.collect().await
    }

    #[tokio::test]
    async fn unscripted_prompt_echoes_cumulatively() {
        let host = SimulatedHost::new(0.8, 3);
        let session = host.create_session(SessionConfig::new(0.8, 3)).await.unwrap();
        let chunks = collect(session.prompt_streaming("ping").await.unwrap()).await;
        let chunks: Vec<String> = chunks.into_iter().map(Result::unwrap).collect();
        assert_eq!(chunks, vec!["You", "You said:", "You said: ping"]);
    }

    #[tokio::test]
    async fn delta_mode_echo_concatenates_to_reply() {
        let host = SimulatedHost::new(0.8, 3).with_chunk_mode(ChunkMode::Delta);
        let session = host.create_session(SessionConfig::new(0.8, 3)).await.unwrap();
        let chunks = collect(session.prompt_streaming("ping").await.unwrap()).await;
        let joined: String = chunks.into_iter().map(Result::unwrap).collect();
        assert_eq!(joined, "You said: ping");
    }

    #[tokio::test]
    async fn token_counters_stay_consistent() {
        let host = SimulatedHost::new(0.8, 3).with_max_tokens(10);
        let session = host.create_session(SessionConfig::new(0.8, 3)).await.unwrap();
        host.push_reply(Reply::chunks(["a b", "a b c d e f g h i j k"]));
        let _ = collect(session.prompt_streaming("one two").await.unwrap()).await;
        assert_eq!(session.tokens_so_far(), 10);
        assert_eq!(session.tokens_left(), 0);
        assert_eq!(session.tokens_so_far() + session.tokens_left(), session.max_tokens());
    }

    #[tokio::test]
    async fn scripted_failure_ends_stream() {
        let host = SimulatedHost::new(0.8, 3);
        let session = host.create_session(SessionConfig::new(0.8, 3)).await.unwrap();
        host.push_reply(Reply::fail_after(["partial"], "timeout"));
        let items = collect(session.prompt_streaming("hi").await.unwrap()).await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Ok("partial".to_string()));
        assert_eq!(items[1], Err(HostError::Failed("timeout".into())));
    }

    #[tokio::test]
    async fn destroy_mid_stream_terminates_with_error() {
        let host = SimulatedHost::new(0.8, 3);
        let session = host.create_session(SessionConfig::new(0.8, 3)).await.unwrap();
        host.push_reply(Reply::chunks(["a", "a b", "a b c"]));
        let mut stream = session.prompt_streaming("go").await.unwrap();
        assert_eq!(stream.next().await, Some(Ok("a".to_string())));
        session.destroy().await;
        assert_eq!(stream.next().await, Some(Err(HostError::SessionDestroyed)));
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn destroy_is_idempotent_and_tracks_live_count() {
        let host = SimulatedHost::new(0.8, 3);
        let session = host.create_session(SessionConfig::new(0.8, 3)).await.unwrap();
        assert_eq!(host.live_sessions(), 1);
        session.destroy().await;
        session.destroy().await;
        assert_eq!(host.live_sessions(), 0);
        assert_eq!(host.sessions_created(), 1);
        assert_eq!(
            session.prompt_streaming("late").await.err(),
            Some(HostError::SessionDestroyed)
        );
    }

    #[tokio::test]
    async fn injected_create_failure_is_reported_once() {
        let host = SimulatedHost::new(0.8, 3);
        host.fail_next_create("out of memory");
        let first = host.create_session(SessionConfig::new(0.8, 3)).await;
        assert_eq!(first.err(), Some(HostError::Failed("out of memory".into())));
        assert!(host.create_session(SessionConfig::new(0.8, 3)).await.is_ok());
    }

    #[tokio::test]
    async fn unavailable_host_refuses_everything() {
        let host = SimulatedHost::unavailable();
        assert_eq!(host.probe().await, Err(HostError::Unsupported));
        assert!(host.create_session(SessionConfig::new(0.5, 1)).await.is_err());
    }
}
