//! Chat state owned by the orchestrator and read by the presentation layer.

use nanochat_common::{NotificationLevel, NotificationQueue};
use serde::Serialize;

use crate::stats::Stats;
use crate::streaming::ChunkMode;
use crate::transcript::{Transcript, Turn};

/// Whether a prompt is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatPhase {
    #[default]
    Idle,
    Sending,
}

/// Fixed texts and knobs the orchestrator is built with.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub welcome_message: String,
    pub cleared_message: String,
    pub chunk_mode: ChunkMode,
    pub notice_capacity: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            welcome_message: "Hello! I'm Gemini Nano. How can I help you today?".into(),
            cleared_message: "Chat cleared. How can I help you?".into(),
            chunk_mode: ChunkMode::Cumulative,
            notice_capacity: 8,
        }
    }
}

#[derive(Debug)]
pub struct ChatState {
    pub(super) phase: ChatPhase,
    pub(super) transcript: Transcript,
    pub(super) stats: Stats,
    pub(super) raw_response: String,
    pub(super) show_raw: bool,
    pub(super) banner: Option<String>,
    pub(super) fatal: bool,
    pub(super) notices: NotificationQueue,
}

impl ChatState {
    pub(super) fn new(notice_capacity: usize) -> Self {
        Self {
            phase: ChatPhase::Idle,
            transcript: Transcript::new(),
            stats: Stats::default(),
            raw_response: String::new(),
            show_raw: false,
            banner: None,
            fatal: false,
            notices: NotificationQueue::new(notice_capacity),
        }
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    pub fn is_sending(&self) -> bool {
        self.phase == ChatPhase::Sending
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Latest assistant text before any markup rendering, for diagnostics.
    pub fn raw_response(&self) -> &str {
        &self.raw_response
    }

    pub fn show_raw(&self) -> bool {
        self.show_raw
    }

    pub fn error_banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// The host lacks the language model API; nothing will ever work.
    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    pub(super) fn view(&mut self) -> ChatView<'_> {
        let notices = self
            .notices
            .visible()
            .into_iter()
            .map(|n| NoticeView {
                level: n.level,
                title: &n.title,
                body: &n.body,
            })
            .collect();
        ChatView {
            transcript: self.transcript.turns(),
            stats: self.stats,
            raw_response: &self.raw_response,
            show_raw: self.show_raw,
            error_banner: self.banner.as_deref(),
            notices,
            is_sending: self.phase == ChatPhase::Sending,
        }
    }
}

/// Everything the presentation layer needs for one render.
#[derive(Debug, Serialize)]
pub struct ChatView<'a> {
    pub transcript: &'a [Turn],
    pub stats: Stats,
    pub raw_response: &'a str,
    pub show_raw: bool,
    pub error_banner: Option<&'a str>,
    pub notices: Vec<NoticeView<'a>>,
    pub is_sending: bool,
}

#[derive(Debug, Serialize)]
pub struct NoticeView<'a> {
    pub level: NotificationLevel,
    pub title: &'a str,
    pub body: &'a str,
}

/// Serialize a view to JSON for presentation layers that render from it.
pub fn view_to_json(view: &ChatView<'_>) -> String {
    serde_json::to_string(view)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize view: {e}\"}}"))
}
