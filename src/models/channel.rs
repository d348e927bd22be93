//! Channel and connector connection state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Messaging channels and CRM connectors a tenant can link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Telegram,
    Instagram,
    Bitrix24,
    Zoho,
    GoogleSheets,
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Telegram => "telegram",
            Self::Instagram => "instagram",
            Self::Bitrix24 => "bitrix24",
            Self::Zoho => "zoho",
            Self::GoogleSheets => "google_sheets",
        };
        write!(f, "{s}")
    }
}

/// Status document returned by every `.../status` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectorStatus {
    #[serde(default)]
    pub connected: bool,
    /// Bot username, portal domain, spreadsheet title, ... depending on the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<DateTime<Utc>>,
    /// Service-specific extras, passed through untouched.
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// `GET /api/integrations/status` — one entry per channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationsStatus {
    pub telegram: ConnectorStatus,
    pub instagram: ConnectorStatus,
    pub bitrix24: ConnectorStatus,
    pub zoho: ConnectorStatus,
    pub google_sheets: ConnectorStatus,
}

impl IntegrationsStatus {
    pub fn get(&self, kind: ChannelKind) -> &ConnectorStatus {
        match kind {
            ChannelKind::Telegram => &self.telegram,
            ChannelKind::Instagram => &self.instagram,
            ChannelKind::Bitrix24 => &self.bitrix24,
            ChannelKind::Zoho => &self.zoho,
            ChannelKind::GoogleSheets => &self.google_sheets,
        }
    }

    /// Channels currently reported as connected.
    pub fn connected(&self) -> Vec<ChannelKind> {
        [
            ChannelKind::Telegram,
            ChannelKind::Instagram,
            ChannelKind::Bitrix24,
            ChannelKind::Zoho,
            ChannelKind::GoogleSheets,
        ]
        .into_iter()
        .filter(|k| self.get(*k).connected)
        .collect()
    }
}

/// Where a connection is in its lifecycle.
///
/// Unconnected → Pending (credential submitted) → Connected | Failed.
/// Only backend responses move a pending connection forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Unconnected,
    Pending,
    Connected {
        identifier: Option<String>,
        connected_at: Option<DateTime<Utc>>,
    },
    Failed {
        reason: String,
    },
}

/// Local view of one channel's connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConnection {
    pub kind: ChannelKind,
    pub state: ConnectionState,
}

impl ChannelConnection {
    pub fn new(kind: ChannelKind) -> Self {
        Self {
            kind,
            state: ConnectionState::Unconnected,
        }
    }

    /// Build from a backend status document.
    pub fn from_status(kind: ChannelKind, status: &ConnectorStatus) -> Self {
        let state = if status.connected {
            ConnectionState::Connected {
                identifier: status.identifier.clone(),
                connected_at: status.connected_at,
            }
        } else {
            ConnectionState::Unconnected
        };
        Self { kind, state }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected { .. })
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, ConnectionState::Pending)
    }

    pub fn identifier(&self) -> Option<&str> {
        match &self.state {
            ConnectionState::Connected { identifier, .. } => identifier.as_deref(),
            _ => None,
        }
    }

    /// A credential was submitted. Any earlier failure is forgotten.
    pub fn begin(&mut self) {
        self.state = ConnectionState::Pending;
    }

    /// Backend accepted the credential.
    pub fn succeed(&mut self, identifier: Option<String>) {
        if !self.is_pending() {
            tracing::warn!(channel = %self.kind, state = ?self.state, "Connection resolved while not pending");
        }
        self.state = ConnectionState::Connected {
            identifier,
            connected_at: Some(Utc::now()),
        };
    }

    /// Backend rejected the credential or the call failed.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if !self.is_pending() {
            tracing::warn!(channel = %self.kind, state = ?self.state, "Connection resolved while not pending");
        }
        self.state = ConnectionState::Failed {
            reason: reason.into(),
        };
    }

    pub fn disconnect(&mut self) {
        self.state = ConnectionState::Unconnected;
    }
}
