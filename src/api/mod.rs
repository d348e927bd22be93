//! Backend API seam.
//!
//! Every network call the console makes goes through the `Backend` trait.
//! `HttpBackend` talks to the real service; tests swap in a stub.

pub mod http;
#[cfg(test)]
pub(crate) mod stub;

pub use http::HttpBackend;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{
    ConfigUpdate, ConnectorStatus, Document, DocumentUpload, GlobalTextDocument,
    IntegrationsStatus, Lead, LeadStatus, RemoteConfig, TestChatReply, TestChatRequest,
};

/// CRM connectors with a status/connect/test/disconnect page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectorKind {
    Bitrix24,
    Zoho,
    GoogleSheets,
}

impl ConnectorKind {
    /// Route prefix for this connector's endpoints.
    pub fn base_path(&self) -> &'static str {
        match self {
            Self::Bitrix24 => "/api/bitrix-crm",
            Self::Zoho => "/api/zoho",
            Self::GoogleSheets => "/api/google-sheets",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Bitrix24 => "Bitrix24",
            Self::Zoho => "Zoho CRM",
            Self::GoogleSheets => "Google Sheets",
        }
    }
}

impl std::fmt::Display for ConnectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Credentials a connector page submits on "connect".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectRequest {
    /// Bitrix24 inbound REST webhook.
    BitrixWebhook { webhook_url: String },
    /// Google spreadsheet shared with the service account.
    GoogleSheet { spreadsheet_url: String },
}

impl ConnectRequest {
    pub fn kind(&self) -> ConnectorKind {
        match self {
            Self::BitrixWebhook { .. } => ConnectorKind::Bitrix24,
            Self::GoogleSheet { .. } => ConnectorKind::GoogleSheets,
        }
    }

    /// JSON body for `POST <base>/connect`.
    pub fn body(&self) -> serde_json::Value {
        match self {
            Self::BitrixWebhook { webhook_url } => serde_json::json!({ "webhook_url": webhook_url }),
            Self::GoogleSheet { spreadsheet_url } => {
                serde_json::json!({ "spreadsheet_url": spreadsheet_url })
            }
        }
    }
}

/// Result of a connector's "test" action.
///
/// A reply without a `success` flag counts as a pass.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct ConnectorTestOutcome {
    pub success: bool,
    pub message: Option<String>,
}

impl Default for ConnectorTestOutcome {
    fn default() -> Self {
        Self {
            success: true,
            message: None,
        }
    }
}

/// Everything the console asks of the backend.
#[async_trait]
pub trait Backend: Send + Sync {
    // ── Agent config ────────────────────────────────────────────────

    async fn get_config(&self) -> Result<RemoteConfig, ApiError>;

    async fn update_config(&self, update: &ConfigUpdate) -> Result<(), ApiError>;

    // ── Tenant documents ────────────────────────────────────────────

    async fn upload_document(&self, upload: DocumentUpload) -> Result<Document, ApiError>;

    async fn delete_document(&self, id: &str) -> Result<(), ApiError>;

    // ── Test chat ───────────────────────────────────────────────────

    async fn test_chat(&self, request: &TestChatRequest) -> Result<TestChatReply, ApiError>;

    // ── Telegram bot ────────────────────────────────────────────────

    /// Returns the bot's username.
    async fn connect_telegram_bot(&self, bot_token: &str) -> Result<String, ApiError>;

    async fn disconnect_telegram_bot(&self) -> Result<(), ApiError>;

    // ── Connectors ──────────────────────────────────────────────────

    async fn integrations_status(&self) -> Result<IntegrationsStatus, ApiError>;

    async fn connector_status(&self, kind: ConnectorKind) -> Result<ConnectorStatus, ApiError>;

    async fn connector_connect(&self, request: &ConnectRequest) -> Result<(), ApiError>;

    async fn connector_test(&self, kind: ConnectorKind) -> Result<ConnectorTestOutcome, ApiError>;

    async fn connector_disconnect(&self, kind: ConnectorKind) -> Result<(), ApiError>;

    /// Zoho OAuth consent URL the user must open.
    async fn zoho_auth_url(&self) -> Result<String, ApiError>;

    /// Service-account address a spreadsheet must be shared with.
    async fn google_service_email(&self) -> Result<String, ApiError>;

    // ── Leads ───────────────────────────────────────────────────────

    async fn list_leads(&self) -> Result<Vec<Lead>, ApiError>;

    async fn update_lead_status(&self, id: &str, status: LeadStatus) -> Result<(), ApiError>;

    // ── Shared knowledge base (admin) ───────────────────────────────

    async fn list_global_documents(&self) -> Result<Vec<Document>, ApiError>;

    async fn add_global_text(&self, doc: &GlobalTextDocument) -> Result<Document, ApiError>;

    async fn upload_global_document(&self, upload: DocumentUpload) -> Result<Document, ApiError>;

    async fn delete_global_document(&self, id: &str) -> Result<(), ApiError>;
}
