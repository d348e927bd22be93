//! Test chat — try the configured agent before going live.
//!
//! The backend keeps no conversation state, so every turn replays the whole
//! transcript. A turn is two-phase: the user's line is appended as
//! `Pending`, then becomes `Committed` alongside the reply, or `Failed`
//! alongside a synthetic error line. Nothing is ever removed except by
//! `reset`.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::Backend;
use crate::error::{Error, ValidationError};
use crate::models::{ChatDebug, HistoryMessage, Role, TestChatRequest};

pub const DEFAULT_GREETING: &str = "Hello! I'm your sales assistant. How can I help you today?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Pending,
    Committed,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
    pub state: TurnState,
    /// Set on synthetic lines standing in for a reply that never came.
    pub is_error: bool,
    pub debug: Option<ChatDebug>,
}

impl TranscriptEntry {
    fn new(role: Role, text: impl Into<String>, state: TurnState) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            state,
            is_error: false,
            debug: None,
        }
    }

    /// Whether this entry is replayed to the backend on later turns.
    fn in_history(&self) -> bool {
        self.state == TurnState::Committed && !self.is_error
    }
}

/// Handle for a user line awaiting its reply.
#[derive(Debug)]
#[must_use]
pub struct PendingTurn {
    id: Uuid,
    message: String,
}

pub struct TestChat {
    greeting: String,
    transcript: Vec<TranscriptEntry>,
}

impl TestChat {
    pub fn new(greeting: Option<&str>) -> Self {
        let mut chat = Self {
            greeting: greeting_text(greeting),
            transcript: Vec::new(),
        };
        chat.reset();
        chat
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn len(&self) -> usize {
        self.transcript.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }

    /// Debug metadata from the most recent successful reply.
    pub fn last_debug(&self) -> Option<&ChatDebug> {
        self.transcript.iter().rev().find_map(|e| e.debug.as_ref())
    }

    /// Clear back to the greeting.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.transcript.push(TranscriptEntry::new(
            Role::Assistant,
            self.greeting.clone(),
            TurnState::Committed,
        ));
    }

    /// Use a new greeting (e.g. after the settings step changed it).
    ///
    /// The opening entry is rewritten in place; later turns are kept.
    pub fn set_greeting(&mut self, greeting: Option<&str>) {
        let greeting = greeting_text(greeting);
        if greeting == self.greeting {
            return;
        }
        if let Some(first) = self.transcript.first_mut() {
            first.text = greeting.clone();
        }
        self.greeting = greeting;
    }

    /// Phase one: append the user's line as pending and build the request.
    pub fn begin_turn(&mut self, text: &str) -> Result<(PendingTurn, TestChatRequest), ValidationError> {
        let message = text.trim();
        if message.is_empty() {
            return Err(ValidationError::MissingField { field: "message" });
        }

        let history: Vec<HistoryMessage> = self
            .transcript
            .iter()
            .filter(|e| e.in_history())
            .map(|e| HistoryMessage {
                role: e.role,
                content: e.text.clone(),
            })
            .collect();

        let entry = TranscriptEntry::new(Role::User, message, TurnState::Pending);
        let pending = PendingTurn {
            id: entry.id,
            message: message.to_string(),
        };
        self.transcript.push(entry);

        let request = TestChatRequest {
            message: pending.message.clone(),
            history,
        };
        Ok((pending, request))
    }

    /// Phase two, success: commit the user's line and append the reply.
    pub fn commit(
        &mut self,
        pending: PendingTurn,
        reply: String,
        debug: Option<ChatDebug>,
    ) -> &TranscriptEntry {
        self.settle(&pending, TurnState::Committed);
        let mut entry = TranscriptEntry::new(Role::Assistant, reply, TurnState::Committed);
        entry.debug = debug;
        self.push(entry)
    }

    /// Phase two, failure: mark the user's line failed and explain in-line.
    pub fn fail(&mut self, pending: PendingTurn, message: &str) -> &TranscriptEntry {
        self.settle(&pending, TurnState::Failed);
        let mut entry = TranscriptEntry::new(
            Role::Assistant,
            format!("Error: {message}"),
            TurnState::Committed,
        );
        entry.is_error = true;
        self.push(entry)
    }

    fn push(&mut self, entry: TranscriptEntry) -> &TranscriptEntry {
        let idx = self.transcript.len();
        self.transcript.push(entry);
        &self.transcript[idx]
    }

    fn settle(&mut self, pending: &PendingTurn, state: TurnState) {
        match self.transcript.iter_mut().find(|e| e.id == pending.id) {
            Some(entry) => entry.state = state,
            None => warn!(turn_id = %pending.id, "Settled a turn missing from the transcript"),
        }
    }

    /// Run a whole turn against the backend.
    ///
    /// Backend failures end up in the transcript, not in the return value;
    /// only an empty message is an error.
    pub async fn send(&mut self, backend: &dyn Backend, text: &str) -> Result<&TranscriptEntry, Error> {
        let (pending, request) = self.begin_turn(text)?;
        debug!(history_len = request.history.len(), "Sending test chat turn");

        let entry = match backend.test_chat(&request).await {
            Ok(reply) => self.commit(pending, reply.response, reply.debug),
            Err(e) => {
                warn!(error = %e, "Test chat turn failed");
                self.fail(pending, &e.user_message())
            }
        };
        Ok(entry)
    }
}

fn greeting_text(greeting: Option<&str>) -> String {
    greeting
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .unwrap_or(DEFAULT_GREETING)
        .to_string()
}

impl Default for TestChat {
    fn default() -> Self {
        Self::new(None)
    }
}
