//! Ordered log of chat turns with one mutable in-progress slot.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Role;

/// Content of the assistant turn before the first chunk arrives.
pub const PLACEHOLDER: &str = "...";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranscriptError {
    #[error("transcript is empty")]
    Empty,
    #[error("last turn is not an in-progress assistant reply")]
    NotInProgress,
}

/// Insertion order is display order. Only the placeholder appended by
/// `append_pair` may change, and only until `finish` is called.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
    in_progress: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn and an assistant placeholder, both stamped now.
    /// Returns the index of the placeholder.
    pub fn append_pair(&mut self, user_text: impl Into<String>) -> usize {
        let now = Utc::now();
        self.turns.push(Turn {
            role: Role::User,
            content: user_text.into(),
            timestamp: now,
        });
        self.turns.push(Turn {
            role: Role::Assistant,
            content: PLACEHOLDER.to_string(),
            timestamp: now,
        });
        self.in_progress = true;
        self.turns.len() - 1
    }

    /// Replace the content of the in-progress assistant turn.
    pub fn update_last(&mut self, content: impl Into<String>) -> Result<(), TranscriptError> {
        let in_progress = self.in_progress;
        let last = self.turns.last_mut().ok_or(TranscriptError::Empty)?;
        if !in_progress || last.role != Role::Assistant {
            return Err(TranscriptError::NotInProgress);
        }
        last.content = content.into();
        Ok(())
    }

    /// Freeze the in-progress turn into history.
    pub fn finish(&mut self) {
        self.in_progress = false;
    }

    /// Drop every turn and start over with a single assistant greeting.
    pub fn reset(&mut self, greeting: impl Into<String>) {
        self.turns.clear();
        self.turns.push(Turn::now(Role::Assistant, greeting));
        self.in_progress = false;
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }
}
