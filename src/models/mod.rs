//! Data exchanged with the backend.

pub mod business;
pub mod channel;
pub mod chat;
pub mod config;
pub mod document;
pub mod lead;
pub mod settings;

pub use business::BusinessInfo;
pub use channel::{ChannelConnection, ChannelKind, ConnectionState, ConnectorStatus, IntegrationsStatus};
pub use chat::{ChatDebug, HistoryMessage, Role, TestChatReply, TestChatRequest};
pub use config::{ConfigUpdate, RemoteConfig};
pub use document::{Document, DocumentUpload, GlobalTextDocument};
pub use lead::{Hotness, Lead, LeadStatus, LeadStatusUpdate};
pub use settings::{AgentSettings, EmojiUsage, Language, ResponseLength, Tone};

/// Decode `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de> + Default,
{
    let value: Option<T> = serde::Deserialize::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
