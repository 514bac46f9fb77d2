//! Folds a host chunk stream into a sequence of whole-answer updates.
//!
//! Every update carries the complete answer so far. A consumer replaces
//! what it displays with each update and never appends. The final update
//! is either `Done` (the last answer) or `Failed` (an `"Error: "` marker),
//! and nothing follows it.

use std::pin::Pin;

use futures_util::{stream, Stream, StreamExt};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ChatError, HostError};
use crate::host::ChunkStream;

/// Owned stream of updates for one prompt.
pub type PromptStream = Pin<Box<dyn Stream<Item = AggregateUpdate> + Send>>;

/// How consecutive host chunks relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkMode {
    /// Each chunk is the whole answer so far and replaces the previous one.
    #[default]
    Cumulative,
    /// Each chunk is new text and is appended.
    Delta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    Streaming,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateUpdate {
    /// Whole answer so far, or the error marker when `status` is `Failed`.
    pub content: String,
    pub status: StreamStatus,
    /// Set only on a `Failed` update.
    pub error: Option<ChatError>,
}

impl AggregateUpdate {
    fn streaming(content: String) -> Self {
        Self {
            content,
            status: StreamStatus::Streaming,
            error: None,
        }
    }

    fn done(content: String) -> Self {
        Self {
            content,
            status: StreamStatus::Done,
            error: None,
        }
    }

    pub(crate) fn failed(err: &HostError) -> Self {
        let message = err.to_string();
        Self {
            content: format!("Error: {message}"),
            status: StreamStatus::Failed,
            error: Some(ChatError::Generation(message)),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != StreamStatus::Streaming
    }
}

/// `received` is the untrimmed answer so far. Trimming happens only on the
/// way out, so a delta ending in whitespace still joins its successor.
enum Fold {
    Open { chunks: ChunkStream, received: String },
    Closed,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StreamAggregator {
    mode: ChunkMode,
}

impl StreamAggregator {
    pub fn new(mode: ChunkMode) -> Self {
        Self { mode }
    }

    /// Consume `chunks` lazily. Updates come out in arrival order and the
    /// stream cannot be restarted.
    pub fn consume(&self, chunks: ChunkStream) -> PromptStream {
        let mode = self.mode;
        let start = Fold::Open {
            chunks,
            received: String::new(),
        };
        Box::pin(stream::unfold(start, move |fold| async move {
            let Fold::Open {
                mut chunks,
                mut received,
            } = fold
            else {
                return None;
            };
            match chunks.next().await {
                Some(Ok(chunk)) => {
                    match mode {
                        ChunkMode::Cumulative => received = chunk,
                        ChunkMode::Delta => received.push_str(&chunk),
                    }
                    let update = AggregateUpdate::streaming(received.trim().to_string());
                    Some((update, Fold::Open { chunks, received }))
                }
                Some(Err(e)) => {
                    warn!(error = %e, "stream failed");
                    Some((AggregateUpdate::failed(&e), Fold::Closed))
                }
                None => {
                    let answer = received.trim().to_string();
                    debug!(chars = answer.len(), "stream complete");
                    Some((AggregateUpdate::done(answer), Fold::Closed))
                }
            }
        }))
    }

    /// A stream holding only the terminal failure, for prompts the host
    /// refused to start.
    pub fn failed(&self, err: &HostError) -> PromptStream {
        Box::pin(stream::once(std::future::ready(AggregateUpdate::failed(err))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(items: Vec<Result<&str, HostError>>) -> ChunkStream {
        let owned: Vec<Result<String, HostError>> = items
            .into_iter()
            .map(|r| r.map(str::to_string))
            .collect();
        Box::pin(stream::iter(owned))
    }

    async fn run(aggregator: StreamAggregator, source: ChunkStream) -> Vec<AggregateUpdate> {
        aggregator.consume(source).collect().await
    }

    #[tokio::test]
    async fn cumulative_chunks_replace() {
        let updates = run(
            StreamAggregator::default(),
            chunks(vec![Ok("Hi"), Ok("Hi there"), Ok("Hi there!")]),
        )
        .await;
        let contents: Vec<_> = updates.iter().map(|u| u.content.as_str()).collect();
        assert_eq!(contents, vec!["Hi", "Hi there", "Hi there!", "Hi there!"]);
        assert_eq!(updates.last().unwrap().status, StreamStatus::Done);
        assert!(updates[..3].iter().all(|u| u.status == StreamStatus::Streaming));
    }

    #[tokio::test]
    async fn chunks_are_trimmed() {
        let updates = run(
            StreamAggregator::default(),
            chunks(vec![Ok("  4\n")]),
        )
        .await;
        assert_eq!(updates.last().unwrap().content, "4");
    }

    #[tokio::test]
    async fn delta_chunks_concatenate() {
        let updates = run(
            StreamAggregator::new(ChunkMode::Delta),
            chunks(vec![Ok("Hi "), Ok("there"), Ok("!")]),
        )
        .await;
        assert_eq!(updates[0].content, "Hi");
        assert_eq!(updates.last().unwrap().content, "Hi there!");
        assert_eq!(updates.last().unwrap().status, StreamStatus::Done);
    }

    #[tokio::test]
    async fn failure_is_terminal() {
        let updates = run(
            StreamAggregator::default(),
            chunks(vec![
                Ok("partial"),
                Err(HostError::Failed("timeout".into())),
                Ok("never seen"),
            ]),
        )
        .await;
        assert_eq!(updates.len(), 2);
        let last = &updates[1];
        assert_eq!(last.content, "Error: timeout");
        assert_eq!(last.status, StreamStatus::Failed);
        assert_eq!(last.error, Some(ChatError::Generation("timeout".into())));
    }

    #[tokio::test]
    async fn empty_stream_is_done_with_empty_answer() {
        let updates = run(StreamAggregator::default(), chunks(vec![])).await;
        assert_eq!(updates, vec![AggregateUpdate::done(String::new())]);
    }

    #[tokio::test]
    async fn refused_start_yields_single_failure() {
        let aggregator = StreamAggregator::default();
        let updates: Vec<_> = aggregator
            .failed(&HostError::SessionDestroyed)
            .collect()
            .await;
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].content, "Error: session has been destroyed");
        assert!(updates[0].is_terminal());
    }
}
