//! Chat orchestration.
//!
//! `ChatOrchestrator` wires the session controller, the stream aggregator,
//! and the transcript together. It is an explicit `Idle`/`Sending` state
//! machine: one prompt at a time, and no session swaps while a prompt is in
//! flight.

mod state;


pub use state::{view_to_json, ChatPhase, ChatSettings, ChatState, ChatView, NoticeView};

use std::sync::Arc;

use futures_util::StreamExt;
use nanochat_common::Notification;
use tracing::{debug, error, info, warn};

use crate::error::{ChatError, HostError};
use crate::host::ModelHost;
use crate::session::{SessionConfig, SessionController};
use crate::stats::Stats;
use crate::streaming::{AggregateUpdate, PromptStream, StreamAggregator, StreamStatus};

pub struct ChatOrchestrator {
    controller: SessionController,
    aggregator: StreamAggregator,
    settings: ChatSettings,
    state: ChatState,
}

impl ChatOrchestrator {
    pub fn new(host: Arc<dyn ModelHost>, settings: ChatSettings) -> Self {
        Self {
            controller: SessionController::new(host),
            aggregator: StreamAggregator::new(settings.chunk_mode),
            state: ChatState::new(settings.notice_capacity),
            settings,
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Snapshot for one render.
    pub fn view(&mut self) -> ChatView<'_> {
        self.state.view()
    }

    /// Create the first session and greet.
    pub async fn start(&mut self) -> Result<(), ChatError> {
        match self.controller.initialize().await {
            Ok(session) => {
                self.state.stats = Stats::read(session);
                self.state.transcript.reset(&self.settings.welcome_message);
                self.state.banner = None;
                Ok(())
            }
            Err(e) => {
                self.record_init_failure(&e);
                Err(e)
            }
        }
    }

    /// Begin a prompt.
    ///
    /// Appends the user turn and the assistant placeholder, moves to
    /// `Sending`, and returns the updates to feed back through `apply`.
    /// A prompt the host refuses to start still returns a stream, holding
    /// only the terminal failure.
    pub async fn submit(&mut self, text: &str) -> Result<PromptStream, ChatError> {
        self.ensure_usable()?;
        let prompt = text.trim();
        if prompt.is_empty() {
            return Err(ChatError::EmptyPrompt);
        }
        if self.state.is_sending() {
            warn!("prompt rejected, another prompt is in flight");
            return Err(ChatError::Busy);
        }
        let Some(session) = self.controller.session() else {
            return Err(ChatError::NoSession);
        };

        self.state.transcript.append_pair(prompt);
        self.state.phase = ChatPhase::Sending;
        info!(session = %session.id(), chars = prompt.len(), "prompt submitted");

        match session.prompt_streaming(prompt).await {
            Ok(chunks) => Ok(self.aggregator.consume(chunks)),
            Err(e) => {
                warn!(error = %e, "host refused to start streaming");
                Ok(self.aggregator.failed(&e))
            }
        }
    }

    /// Fold one update into the state. Terminal updates return the chat to
    /// `Idle`; only a `Done` update refreshes the stats.
    pub fn apply(&mut self, update: AggregateUpdate) -> Result<StreamStatus, ChatError> {
        if !self.state.is_sending() {
            error!("stream update received with no prompt in flight");
        }
        self.state.transcript.update_last(update.content.as_str())?;

        match update.status {
            StreamStatus::Streaming => {
                self.state.raw_response = update.content;
            }
            StreamStatus::Done => {
                self.state.raw_response = update.content;
                self.finish_prompt();
                if let Some(stats) = self.controller.refresh_stats() {
                    self.state.stats = stats;
                }
                info!(
                    tokens_so_far = self.state.stats.tokens_so_far,
                    tokens_left = self.state.stats.tokens_left,
                    "prompt complete"
                );
            }
            StreamStatus::Failed => {
                self.finish_prompt();
                if let Some(err) = &update.error {
                    warn!(error = %err, "prompt failed");
                }
            }
        }
        Ok(update.status)
    }

    /// Submit a prompt and drive its stream to the end.
    pub async fn send(&mut self, text: &str) -> Result<StreamStatus, ChatError> {
        let mut updates = self.submit(text).await?;
        let mut status = StreamStatus::Streaming;
        while let Some(update) = updates.next().await {
            status = self.apply(update)?;
            if status != StreamStatus::Streaming {
                break;
            }
        }
        Ok(status)
    }

    /// Replace the session with one using `config`.
    ///
    /// Rejected while a prompt is in flight. A host failure keeps the old
    /// session and is reported as an inline notice.
    pub async fn reconfigure(&mut self, config: SessionConfig) -> Result<(), ChatError> {
        self.ensure_usable()?;
        if self.state.is_sending() {
            warn!("reconfigure rejected, a prompt is in flight");
            return Err(ChatError::Busy);
        }
        match self.controller.reconfigure(config).await {
            Ok(Some(session)) => {
                self.state.stats = Stats::read(session);
                self.state.notices.push(Notification::info(
                    "Settings",
                    format!("temperature {}, top-K {}", config.temperature, config.top_k),
                ));
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => {
                self.state
                    .notices
                    .push(Notification::error("Configuration", e.to_string()));
                Err(e)
            }
        }
    }

    /// Abandon the prompt in flight. Does nothing while `Idle`.
    ///
    /// The host only stops generating when its session goes away, so the
    /// session is destroyed, the placeholder is closed with an error marker,
    /// and a new session is created with the same sampling parameters.
    /// Stats then describe the new session.
    pub async fn cancel(&mut self) -> Result<(), ChatError> {
        if !self.state.is_sending() {
            return Ok(());
        }
        let config = self.current_config();
        self.controller.destroy().await;
        self.apply(AggregateUpdate::failed(&HostError::Failed(
            "prompt cancelled".into(),
        )))?;
        self.state
            .notices
            .push(Notification::warning("Prompt", "cancelled, session restarted"));

        match self.controller.recreate(config).await {
            Ok(session) => {
                self.state.stats = Stats::read(session);
                info!("prompt cancelled");
                Ok(())
            }
            Err(e) => {
                self.record_init_failure(&e);
                Err(e)
            }
        }
    }

    /// Change only the temperature.
    pub async fn set_temperature(&mut self, temperature: f64) -> Result<(), ChatError> {
        let config = self.current_config().with_temperature(temperature);
        self.reconfigure(config).await
    }

    /// Change only top-K.
    pub async fn set_top_k(&mut self, top_k: u32) -> Result<(), ChatError> {
        let config = self.current_config().with_top_k(top_k);
        self.reconfigure(config).await
    }

    /// Destroy the session, reset the transcript to the cleared message,
    /// and start a fresh session. The transcript holds exactly one turn
    /// afterwards.
    pub async fn clear(&mut self) -> Result<(), ChatError> {
        self.ensure_usable()?;
        if self.state.is_sending() {
            warn!("clear rejected, a prompt is in flight");
            return Err(ChatError::Busy);
        }

        self.controller.destroy().await;
        self.state.transcript.reset(&self.settings.cleared_message);
        self.state.raw_response.clear();
        self.state.notices.clear();
        self.state.stats = Stats::default();

        match self.controller.initialize().await {
            Ok(session) => {
                self.state.stats = Stats::read(session);
                self.state.banner = None;
                info!("chat cleared");
                Ok(())
            }
            Err(e) => {
                self.record_init_failure(&e);
                Err(e)
            }
        }
    }

    /// Flip raw-response display; returns the new setting.
    pub fn toggle_raw(&mut self) -> bool {
        self.state.show_raw = !self.state.show_raw;
        self.state.show_raw
    }

    fn current_config(&self) -> SessionConfig {
        self.controller.config().unwrap_or(SessionConfig {
            temperature: self.state.stats.temperature,
            top_k: self.state.stats.top_k,
        })
    }

    fn finish_prompt(&mut self) {
        self.state.transcript.finish();
        self.state.phase = ChatPhase::Idle;
    }

    fn ensure_usable(&self) -> Result<(), ChatError> {
        if self.state.fatal {
            debug!("chat surface disabled, host is unsupported");
            return Err(ChatError::Unsupported);
        }
        Ok(())
    }

    fn record_init_failure(&mut self, err: &ChatError) {
        error!(error = %err, "chat initialization failed");
        if err.is_fatal() {
            self.state.fatal = true;
        }
        self.state.banner = Some(err.to_string());
    }
}
