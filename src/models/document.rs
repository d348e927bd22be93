//! Knowledge documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document the backend has accepted into a knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(alias = "name")]
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Ingestion status as reported by the backend (e.g. "processing", "ready").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A file ready to be sent to an upload endpoint.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Text entry for the shared knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalTextDocument {
    pub title: String,
    pub content: String,
}
