//! Test-chat wire types.

use serde::{Deserialize, Serialize};

use super::lead::Hotness;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One prior turn, as replayed to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
}

/// `POST /api/chat/test` body. The backend keeps no session, so the whole
/// prior transcript travels with every turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestChatRequest {
    pub message: String,
    pub history: Vec<HistoryMessage>,
}

/// Backend diagnostics attached to a test reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatDebug {
    pub sales_stage: Option<String>,
    pub hotness: Option<Hotness>,
    pub score: Option<f64>,
    pub sources_used: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestChatReply {
    pub response: String,
    #[serde(default)]
    pub debug: Option<ChatDebug>,
}
