//! reqwest-backed implementation of `Backend`.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{Backend, ConnectRequest, ConnectorKind, ConnectorTestOutcome};
use crate::config::ConsoleConfig;
use crate::error::ApiError;
use crate::models::{
    ConfigUpdate, ConnectorStatus, Document, DocumentUpload, GlobalTextDocument,
    IntegrationsStatus, Lead, LeadStatus, LeadStatusUpdate, RemoteConfig, TestChatReply,
    TestChatRequest,
};
use crate::session::SessionContext;

#[derive(Deserialize)]
struct TelegramBotResponse {
    #[serde(alias = "username")]
    bot_username: String,
}

#[derive(Deserialize)]
struct AuthUrlResponse {
    auth_url: String,
}

#[derive(Deserialize)]
struct ServiceEmailResponse {
    #[serde(alias = "service_email")]
    email: String,
}

/// Some list endpoints return a bare array, others wrap it.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListPayload<T> {
    Bare(Vec<T>),
    Leads { leads: Vec<T> },
    Documents { documents: Vec<T> },
}

impl<T> ListPayload<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(v) | Self::Leads { leads: v } | Self::Documents { documents: v } => v,
        }
    }
}

/// Talks to the backend over HTTP with the session's bearer token.
pub struct HttpBackend {
    config: ConsoleConfig,
    session: SessionContext,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: ConsoleConfig, session: SessionContext) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            config,
            session,
            client,
        })
    }

    /// Start a request. Fails locally, before anything is sent, when logged out.
    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let bearer = self
            .session
            .bearer()
            .await
            .ok_or(ApiError::NotAuthenticated)?;
        debug!(%method, path, "Backend request");
        Ok(self
            .client
            .request(method, self.config.endpoint(path))
            .header(AUTHORIZATION, bearer))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let resp = builder.send().await?;
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let url = resp.url().path().to_string();
        let body = resp.text().await.unwrap_or_default();
        let message = extract_message(&body);
        warn!(status, path = %url, message = ?message, "Backend request failed");
        Err(ApiError::Backend { status, message })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.send(self.request(Method::GET, path).await?).await?;
        decode(resp).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .send(self.request(method, path).await?.json(body))
            .await?;
        decode(resp).await
    }

    /// Send and ignore whatever the success body contains.
    async fn send_unit(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.send(builder).await?;
        Ok(())
    }

    async fn upload(&self, path: &str, upload: DocumentUpload) -> Result<Document, ApiError> {
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(upload.content_type)?;
        let form = Form::new().part("file", part);
        let resp = self
            .send(self.request(Method::POST, path).await?.multipart(form))
            .await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let text = resp.text().await?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `detail`, `message` and `error` in that order. A FastAPI-style
/// validation `detail` array yields its first entry's `msg`.
pub fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    for key in ["detail", "message", "error"] {
        match value.get(key) {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
                return Some(s.clone());
            }
            Some(serde_json::Value::Array(items)) => {
                if let Some(msg) = items
                    .first()
                    .and_then(|i| i.get("msg"))
                    .and_then(|m| m.as_str())
                {
                    return Some(msg.to_string());
                }
            }
            _ => {}
        }
    }
    None
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get_config(&self) -> Result<RemoteConfig, ApiError> {
        self.get_json("/api/config").await
    }

    async fn update_config(&self, update: &ConfigUpdate) -> Result<(), ApiError> {
        self.send_unit(self.request(Method::PUT, "/api/config").await?.json(update))
            .await
    }

    async fn upload_document(&self, upload: DocumentUpload) -> Result<Document, ApiError> {
        self.upload("/api/documents/upload", upload).await
    }

    async fn delete_document(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/api/documents/{id}");
        self.send_unit(self.request(Method::DELETE, &path).await?)
            .await
    }

    async fn test_chat(&self, request: &TestChatRequest) -> Result<TestChatReply, ApiError> {
        self.send_json(Method::POST, "/api/chat/test", request)
            .await
    }

    async fn connect_telegram_bot(&self, bot_token: &str) -> Result<String, ApiError> {
        let body = serde_json::json!({ "bot_token": bot_token });
        let resp: TelegramBotResponse = self
            .send_json(Method::POST, "/api/telegram/bot", &body)
            .await?;
        Ok(resp.bot_username)
    }

    async fn disconnect_telegram_bot(&self) -> Result<(), ApiError> {
        self.send_unit(self.request(Method::DELETE, "/api/telegram/bot").await?)
            .await
    }

    async fn integrations_status(&self) -> Result<IntegrationsStatus, ApiError> {
        self.get_json("/api/integrations/status").await
    }

    async fn connector_status(&self, kind: ConnectorKind) -> Result<ConnectorStatus, ApiError> {
        self.get_json(&format!("{}/status", kind.base_path())).await
    }

    async fn connector_connect(&self, request: &ConnectRequest) -> Result<(), ApiError> {
        let path = format!("{}/connect", request.kind().base_path());
        self.send_unit(self.request(Method::POST, &path).await?.json(&request.body()))
            .await
    }

    async fn connector_test(&self, kind: ConnectorKind) -> Result<ConnectorTestOutcome, ApiError> {
        let path = format!("{}/test", kind.base_path());
        let resp = self.send(self.request(Method::POST, &path).await?).await?;
        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(ConnectorTestOutcome::default());
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn connector_disconnect(&self, kind: ConnectorKind) -> Result<(), ApiError> {
        let path = format!("{}/disconnect", kind.base_path());
        self.send_unit(self.request(Method::POST, &path).await?)
            .await
    }

    async fn zoho_auth_url(&self) -> Result<String, ApiError> {
        let resp: AuthUrlResponse = self.get_json("/api/zoho/auth-url").await?;
        Ok(resp.auth_url)
    }

    async fn google_service_email(&self) -> Result<String, ApiError> {
        let resp: ServiceEmailResponse = self.get_json("/api/google-sheets/service-email").await?;
        Ok(resp.email)
    }

    async fn list_leads(&self) -> Result<Vec<Lead>, ApiError> {
        let payload: ListPayload<Lead> = self.get_json("/api/leads").await?;
        Ok(payload.into_vec())
    }

    async fn update_lead_status(&self, id: &str, status: LeadStatus) -> Result<(), ApiError> {
        let path = format!("/api/leads/{id}/status");
        self.send_unit(
            self.request(Method::PUT, &path)
                .await?
                .json(&LeadStatusUpdate { status }),
        )
        .await
    }

    async fn list_global_documents(&self) -> Result<Vec<Document>, ApiError> {
        let payload: ListPayload<Document> = self.get_json("/api/documents/global").await?;
        Ok(payload.into_vec())
    }

    async fn add_global_text(&self, doc: &GlobalTextDocument) -> Result<Document, ApiError> {
        self.send_json(Method::POST, "/api/documents/global", doc)
            .await
    }

    async fn upload_global_document(&self, upload: DocumentUpload) -> Result<Document, ApiError> {
        self.upload("/api/documents/global/upload", upload).await
    }

    async fn delete_global_document(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/api/documents/global/{id}");
        self.send_unit(self.request(Method::DELETE, &path).await?)
            .await
    }
}
