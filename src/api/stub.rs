//! In-memory `Backend` for unit tests. Records every call it receives.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Backend, ConnectRequest, ConnectorKind, ConnectorTestOutcome};
use crate::error::ApiError;
use crate::models::{
    ChatDebug, ConfigUpdate, ConnectorStatus, Document, DocumentUpload, GlobalTextDocument,
    Hotness, IntegrationsStatus, Lead, LeadStatus, RemoteConfig, TestChatReply, TestChatRequest,
};

#[derive(Default)]
struct StubState {
    calls: Vec<String>,
    config: RemoteConfig,
    config_updates: Vec<ConfigUpdate>,
    uploads: Vec<String>,
    failing_uploads: HashSet<String>,
    chat_requests: Vec<TestChatRequest>,
    connectors: HashMap<ConnectorKind, ConnectorStatus>,
    leads: Vec<Lead>,
    global_docs: Vec<Document>,
    /// Endpoint label → (status, message) to fail with.
    failures: HashMap<&'static str, (u16, Option<String>)>,
    next_id: u32,
}

#[derive(Default)]
pub(crate) struct StubBackend {
    state: Mutex<StubState>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RemoteConfig) -> Self {
        let stub = Self::default();
        stub.state.lock().unwrap().config = config;
        stub
    }

    pub fn with_leads(leads: Vec<Lead>) -> Self {
        let stub = Self::default();
        stub.state.lock().unwrap().leads = leads;
        stub
    }

    /// Make every call to `endpoint` fail until `recover` is called.
    pub fn fail(&self, endpoint: &'static str, status: u16, message: Option<&str>) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(endpoint, (status, message.map(String::from)));
    }

    pub fn recover(&self, endpoint: &'static str) {
        self.state.lock().unwrap().failures.remove(endpoint);
    }

    pub fn fail_upload_of(&self, file_name: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_uploads
            .insert(file_name.to_string());
    }

    /// Change what the status endpoint reports, as another tab or the backend might.
    pub fn set_connector_status(&self, kind: ConnectorKind, status: ConnectorStatus) {
        self.state.lock().unwrap().connectors.insert(kind, status);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn config_updates(&self) -> Vec<ConfigUpdate> {
        self.state.lock().unwrap().config_updates.clone()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.state.lock().unwrap().uploads.clone()
    }

    pub fn chat_requests(&self) -> Vec<TestChatRequest> {
        self.state.lock().unwrap().chat_requests.clone()
    }

    fn enter(&self, endpoint: &'static str) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(endpoint.to_string());
        match state.failures.get(endpoint) {
            Some((status, message)) => Err(ApiError::Backend {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn make_document(&self, filename: String, size: usize) -> Document {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        Document {
            id: format!("doc-{}", state.next_id),
            filename,
            size_bytes: Some(size as u64),
            status: Some("processing".to_string()),
            created_at: None,
        }
    }
}

#[async_trait]
impl Backend for StubBackend {
    async fn get_config(&self) -> Result<RemoteConfig, ApiError> {
        self.enter("GET /api/config")?;
        Ok(self.state.lock().unwrap().config.clone())
    }

    async fn update_config(&self, update: &ConfigUpdate) -> Result<(), ApiError> {
        self.enter("PUT /api/config")?;
        let mut state = self.state.lock().unwrap();
        match update {
            ConfigUpdate::Business(b) => state.config.business = b.clone(),
            ConfigUpdate::Settings(s) => state.config.settings = s.clone(),
        }
        state.config_updates.push(update.clone());
        Ok(())
    }

    async fn upload_document(&self, upload: DocumentUpload) -> Result<Document, ApiError> {
        self.enter("POST /api/documents/upload")?;
        {
            let mut state = self.state.lock().unwrap();
            state.uploads.push(upload.file_name.clone());
            if state.failing_uploads.contains(&upload.file_name) {
                return Err(ApiError::Backend {
                    status: 422,
                    message: Some(format!("Could not parse {}", upload.file_name)),
                });
            }
        }
        Ok(self.make_document(upload.file_name, upload.bytes.len()))
    }

    async fn delete_document(&self, _id: &str) -> Result<(), ApiError> {
        self.enter("DELETE /api/documents/{id}")
    }

    async fn test_chat(&self, request: &TestChatRequest) -> Result<TestChatReply, ApiError> {
        self.enter("POST /api/chat/test")?;
        self.state
            .lock()
            .unwrap()
            .chat_requests
            .push(request.clone());
        Ok(TestChatReply {
            response: format!("echo: {}", request.message),
            debug: Some(ChatDebug {
                sales_stage: Some("discovery".to_string()),
                hotness: Some(Hotness::Warm),
                score: Some(42.0),
                sources_used: vec!["prices.pdf".to_string()],
            }),
        })
    }

    async fn connect_telegram_bot(&self, bot_token: &str) -> Result<String, ApiError> {
        self.enter("POST /api/telegram/bot")?;
        let id = bot_token.split(':').next().unwrap_or_default();
        Ok(format!("bot_{id}"))
    }

    async fn disconnect_telegram_bot(&self) -> Result<(), ApiError> {
        self.enter("DELETE /api/telegram/bot")
    }

    async fn integrations_status(&self) -> Result<IntegrationsStatus, ApiError> {
        self.enter("GET /api/integrations/status")?;
        let state = self.state.lock().unwrap();
        let get = |k| state.connectors.get(&k).cloned().unwrap_or_default();
        Ok(IntegrationsStatus {
            bitrix24: get(ConnectorKind::Bitrix24),
            zoho: get(ConnectorKind::Zoho),
            google_sheets: get(ConnectorKind::GoogleSheets),
            ..Default::default()
        })
    }

    async fn connector_status(&self, kind: ConnectorKind) -> Result<ConnectorStatus, ApiError> {
        self.enter("GET connector/status")?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .connectors
            .get(&kind)
            .cloned()
            .unwrap_or_default())
    }

    async fn connector_connect(&self, request: &ConnectRequest) -> Result<(), ApiError> {
        self.enter("POST connector/connect")?;
        let identifier = match request {
            ConnectRequest::BitrixWebhook { webhook_url } => webhook_url
                .trim_start_matches("https://")
                .split('/')
                .next()
                .map(String::from),
            ConnectRequest::GoogleSheet { .. } => Some("Leads sheet".to_string()),
        };
        self.state.lock().unwrap().connectors.insert(
            request.kind(),
            ConnectorStatus {
                connected: true,
                identifier,
                ..Default::default()
            },
        );
        Ok(())
    }

    async fn connector_test(&self, _kind: ConnectorKind) -> Result<ConnectorTestOutcome, ApiError> {
        self.enter("POST connector/test")?;
        Ok(ConnectorTestOutcome {
            success: true,
            message: Some("Test lead created".to_string()),
        })
    }

    async fn connector_disconnect(&self, kind: ConnectorKind) -> Result<(), ApiError> {
        self.enter("POST connector/disconnect")?;
        self.state.lock().unwrap().connectors.remove(&kind);
        Ok(())
    }

    async fn zoho_auth_url(&self) -> Result<String, ApiError> {
        self.enter("GET /api/zoho/auth-url")?;
        Ok("https://accounts.zoho.com/oauth/v2/auth?client_id=stub".to_string())
    }

    async fn google_service_email(&self) -> Result<String, ApiError> {
        self.enter("GET /api/google-sheets/service-email")?;
        Ok("sync@stub-project.iam.gserviceaccount.com".to_string())
    }

    async fn list_leads(&self) -> Result<Vec<Lead>, ApiError> {
        self.enter("GET /api/leads")?;
        Ok(self.state.lock().unwrap().leads.clone())
    }

    async fn update_lead_status(&self, id: &str, status: LeadStatus) -> Result<(), ApiError> {
        self.enter("PUT /api/leads/{id}/status")?;
        let mut state = self.state.lock().unwrap();
        match state.leads.iter_mut().find(|l| l.id == id) {
            Some(lead) => {
                lead.status = status;
                Ok(())
            }
            None => Err(ApiError::Backend {
                status: 404,
                message: Some("Lead not found".to_string()),
            }),
        }
    }

    async fn list_global_documents(&self) -> Result<Vec<Document>, ApiError> {
        self.enter("GET /api/documents/global")?;
        Ok(self.state.lock().unwrap().global_docs.clone())
    }

    async fn add_global_text(&self, doc: &GlobalTextDocument) -> Result<Document, ApiError> {
        self.enter("POST /api/documents/global")?;
        let created = self.make_document(doc.title.clone(), doc.content.len());
        self.state
            .lock()
            .unwrap()
            .global_docs
            .push(created.clone());
        Ok(created)
    }

    async fn upload_global_document(&self, upload: DocumentUpload) -> Result<Document, ApiError> {
        self.enter("POST /api/documents/global/upload")?;
        let created = self.make_document(upload.file_name, upload.bytes.len());
        self.state
            .lock()
            .unwrap()
            .global_docs
            .push(created.clone());
        Ok(created)
    }

    async fn delete_global_document(&self, id: &str) -> Result<(), ApiError> {
        self.enter("DELETE /api/documents/global/{id}")?;
        self.state
            .lock()
            .unwrap()
            .global_docs
            .retain(|d| d.id != id);
        Ok(())
    }
}
