//! Integration tests for `HttpBackend` and the pages built on it.
//!
//! Each test spins up a fake backend with Axum on a random port and drives
//! the real reqwest client against it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use sales_console::api::{Backend, ConnectRequest, ConnectorKind, HttpBackend};
use sales_console::config::ConsoleConfig;
use sales_console::connectors::ConnectorPage;
use sales_console::error::{ApiError, Error};
use sales_console::leads::{LeadBoard, LeadFilter};
use sales_console::models::{Hotness, LeadStatus};
use sales_console::notify::{NotificationLevel, NotificationLog};
use sales_console::session::SessionContext;
use sales_console::wizard::{AdvanceOutcome, OnboardingWizard, UploadFile, WizardStep};

const TOKEN: &str = "test-token";
const BOT_TOKEN: &str = "123456789:AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsawQ";

#[derive(Default)]
struct Recorded {
    config_puts: Vec<Value>,
    uploads: Vec<(String, usize)>,
    chat_bodies: Vec<Value>,
    bitrix: Option<String>,
    lead_updates: Vec<(String, Value)>,
}

#[derive(Clone, Default)]
struct Fake {
    recorded: Arc<Mutex<Recorded>>,
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

async fn require_bearer(req: Request, next: Next) -> Response {
    let expected = format!("Bearer {TOKEN}");
    let ok = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str());
    if !ok {
        return detail(StatusCode::UNAUTHORIZED, "Not authenticated");
    }
    next.run(req).await
}

async fn get_config() -> Json<Value> {
    Json(json!({
        "business_name": "Texnomart",
        "business_description": "Electronics retail",
        "tone": "professional",
        "primary_language": "uz",
        "greeting_message": "Assalomu alaykum!",
        "documents": [{ "id": "d1", "filename": "prices.pdf" }]
    }))
}

async fn put_config(State(fake): State<Fake>, Json(body): Json<Value>) -> Json<Value> {
    fake.recorded.lock().unwrap().config_puts.push(body);
    Json(json!({ "status": "ok" }))
}

async fn upload(State(fake): State<Fake>, mut multipart: Multipart) -> Response {
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap();
        if name.starts_with("corrupt") {
            return detail(StatusCode::UNPROCESSABLE_ENTITY, "Could not extract text");
        }
        let mut recorded = fake.recorded.lock().unwrap();
        recorded.uploads.push((name.clone(), bytes.len()));
        let id = format!("up-{}", recorded.uploads.len());
        return Json(json!({ "id": id, "filename": name, "size_bytes": bytes.len() }))
            .into_response();
    }
    detail(StatusCode::BAD_REQUEST, "No file")
}

async fn chat(State(fake): State<Fake>, Json(body): Json<Value>) -> Response {
    let message = body["message"].as_str().unwrap_or_default().to_string();
    fake.recorded.lock().unwrap().chat_bodies.push(body);
    if message == "overload" {
        return detail(StatusCode::SERVICE_UNAVAILABLE, "Model is overloaded");
    }
    Json(json!({
        "response": format!("Reply to {message}"),
        "debug": { "sales_stage": "qualification", "hotness": "hot", "score": 81, "sources_used": ["prices.pdf"] }
    }))
    .into_response()
}

async fn telegram_bot(Json(body): Json<Value>) -> Response {
    if body["bot_token"] == BOT_TOKEN {
        Json(json!({ "bot_username": "texnomart_sales_bot" })).into_response()
    } else {
        detail(StatusCode::BAD_REQUEST, "Invalid bot token")
    }
}

async fn bitrix_status(State(fake): State<Fake>) -> Json<Value> {
    match &fake.recorded.lock().unwrap().bitrix {
        Some(portal) => Json(json!({ "connected": true, "portal": portal, "identifier": portal })),
        None => Json(json!({ "connected": false })),
    }
}

async fn bitrix_connect(State(fake): State<Fake>, Json(body): Json<Value>) -> Json<Value> {
    let url = body["webhook_url"].as_str().unwrap_or_default();
    let portal = url.trim_start_matches("https://").split('/').next().unwrap_or_default();
    fake.recorded.lock().unwrap().bitrix = Some(portal.to_string());
    Json(json!({ "success": true }))
}

async fn bitrix_disconnect(State(fake): State<Fake>) -> StatusCode {
    fake.recorded.lock().unwrap().bitrix = None;
    StatusCode::NO_CONTENT
}

async fn bitrix_test() -> Json<Value> {
    Json(json!({ "success": false, "message": "Webhook lacks crm scope" }))
}

async fn leads() -> Json<Value> {
    Json(json!({
        "leads": [
            { "id": "1", "name": "Aziz", "phone": "+998901112233", "product": "iPhone 15", "status": "new", "hotness": "hot" },
            { "id": "2", "name": "Malika", "phone": "+998907778899", "product": "Dyson V15", "status": "contacted", "hotness": "cold" }
        ]
    }))
}

async fn lead_status(
    State(fake): State<Fake>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if id != "1" && id != "2" {
        return detail(StatusCode::NOT_FOUND, "Lead not found");
    }
    fake.recorded.lock().unwrap().lead_updates.push((id, body));
    StatusCode::OK.into_response()
}

/// Start the fake backend on a random port; return its base URL and recorder.
async fn start_server() -> (String, Fake) {
    let fake = Fake::default();
    let app = Router::new()
        .route("/api/config", get(get_config).put(put_config))
        .route("/api/documents/upload", post(upload))
        .route("/api/chat/test", post(chat))
        .route("/api/telegram/bot", post(telegram_bot))
        .route("/api/integrations/status", get(|| async { Json(json!({})) }))
        .route("/api/bitrix-crm/status", get(bitrix_status))
        .route("/api/bitrix-crm/connect", post(bitrix_connect))
        .route("/api/bitrix-crm/test", post(bitrix_test))
        .route("/api/bitrix-crm/disconnect", post(bitrix_disconnect))
        .route("/api/leads", get(leads))
        .route("/api/leads/{id}/status", put(lead_status))
        .layer(middleware::from_fn(require_bearer))
        .with_state(fake.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}"), fake)
}

async fn client(base: &str, token: Option<&str>) -> (Arc<HttpBackend>, SessionContext) {
    let session = SessionContext::new();
    if let Some(token) = token {
        session.login(token.to_string().into()).await;
    }
    let config = ConsoleConfig {
        api_url: base.to_string(),
        request_timeout: Duration::from_secs(5),
        ..Default::default()
    };
    let backend = HttpBackend::new(config, session.clone()).unwrap();
    (Arc::new(backend), session)
}

#[tokio::test]
async fn resume_then_advance_puts_business_fields() {
    let (base, fake) = start_server().await;
    let (backend, _session) = client(&base, Some(TOKEN)).await;
    let log = Arc::new(NotificationLog::new());
    let mut wizard = OnboardingWizard::new(backend, log.clone());

    wizard.resume().await.unwrap();
    assert_eq!(wizard.business.name, "Texnomart");
    assert_eq!(wizard.documents().len(), 1);
    assert_eq!(wizard.chat().transcript()[0].text, "Assalomu alaykum!");

    wizard.business.description = "  Phones and laptops  ".to_string();
    let outcome = wizard.advance().await.unwrap();
    assert_eq!(outcome, AdvanceOutcome::Moved(WizardStep::Knowledge));

    let puts = fake.recorded.lock().unwrap().config_puts.clone();
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0]["business_name"], "Texnomart");
    assert_eq!(puts[0]["business_description"], "Phones and laptops");
    assert!(puts[0].get("tone").is_none());
}

#[tokio::test]
async fn wrong_token_surfaces_backend_detail() {
    let (base, _fake) = start_server().await;
    let (backend, _session) = client(&base, Some("stale-token")).await;

    let err = backend.get_config().await.unwrap_err();
    match &err {
        ApiError::Backend { status, message } => {
            assert_eq!(*status, 401);
            assert_eq!(message.as_deref(), Some("Not authenticated"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.user_message(), "Not authenticated");
}

#[tokio::test]
async fn logout_stops_requests_before_the_network() {
    let (base, fake) = start_server().await;
    let (backend, session) = client(&base, Some(TOKEN)).await;
    let mut wizard = OnboardingWizard::new(backend.clone(), Arc::new(NotificationLog::new()));
    wizard.business.name = "Texnomart".to_string();
    wizard.business.description = "Electronics".to_string();

    session.logout().await;
    let err = wizard.advance().await.unwrap_err();
    assert!(matches!(err, Error::Api(ApiError::NotAuthenticated)));
    assert_eq!(wizard.current_step(), WizardStep::Business);
    assert!(fake.recorded.lock().unwrap().config_puts.is_empty());
}

#[tokio::test]
async fn uploads_go_one_by_one_as_multipart() {
    let (base, fake) = start_server().await;
    let (backend, _session) = client(&base, Some(TOKEN)).await;
    let log = Arc::new(NotificationLog::new());
    let mut wizard = OnboardingWizard::new(backend, log.clone());

    let report = wizard
        .upload_documents(vec![
            UploadFile::from_bytes("catalog.pdf", vec![0u8; 2048]),
            UploadFile::from_bytes("corrupt.docx", vec![1u8; 10]),
            UploadFile::from_bytes("faq.txt", b"Delivery takes 2 days".to_vec()),
        ])
        .await;

    assert_eq!(report.accepted.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].1, "Could not extract text");
    assert_eq!(wizard.documents().len(), 2);

    let uploads = fake.recorded.lock().unwrap().uploads.clone();
    assert_eq!(
        uploads,
        vec![("catalog.pdf".to_string(), 2048), ("faq.txt".to_string(), 21)]
    );
    assert_eq!(log.count(NotificationLevel::Error), 1);
}

#[tokio::test]
async fn test_chat_replays_history_and_records_failures() {
    let (base, fake) = start_server().await;
    let (backend, _session) = client(&base, Some(TOKEN)).await;
    let mut wizard = OnboardingWizard::new(backend, Arc::new(NotificationLog::new()));

    wizard.send_test_message("Do you have iPhone 15?").await.unwrap();
    wizard.send_test_message("overload").await.unwrap();
    wizard.send_test_message("How much?").await.unwrap();

    let transcript = wizard.chat().transcript();
    assert_eq!(transcript.len(), 7);
    assert!(transcript[4].is_error);
    assert_eq!(transcript[4].text, "Error: Model is overloaded");
    let debug = wizard.chat().last_debug().unwrap();
    assert_eq!(debug.hotness, Some(Hotness::Hot));
    assert_eq!(debug.sources_used, vec!["prices.pdf"]);

    let bodies = fake.recorded.lock().unwrap().chat_bodies.clone();
    assert_eq!(bodies[0]["history"].as_array().unwrap().len(), 1);
    // Greeting + first exchange; the failed turn is not replayed.
    assert_eq!(bodies[2]["history"].as_array().unwrap().len(), 3);
    assert_eq!(bodies[2]["history"][2]["role"], "assistant");
}

#[tokio::test]
async fn telegram_connect_reports_bot_username() {
    let (base, _fake) = start_server().await;
    let (backend, _session) = client(&base, Some(TOKEN)).await;
    let mut wizard = OnboardingWizard::new(backend.clone(), Arc::new(NotificationLog::new()));

    wizard.connect_telegram(BOT_TOKEN).await.unwrap();
    assert!(wizard.telegram().connection().is_connected());
    assert_eq!(wizard.telegram().username(), Some("texnomart_sales_bot"));

    let err = backend
        .connect_telegram_bot("987654321:AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaww")
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Invalid bot token");
}

#[tokio::test]
async fn connector_page_follows_backend_status() {
    let (base, _fake) = start_server().await;
    let (backend, _session) = client(&base, Some(TOKEN)).await;
    let log = Arc::new(NotificationLog::new());
    let mut page = ConnectorPage::mount(ConnectorKind::Bitrix24, backend.clone(), log.clone()).await;
    assert!(!page.is_connected());

    page.connect(ConnectRequest::BitrixWebhook {
        webhook_url: "https://texnomart.bitrix24.ru/rest/7/abc123def456/".to_string(),
    })
    .await
    .unwrap();
    assert!(page.is_connected());
    let status = page.status().unwrap();
    assert_eq!(status.identifier.as_deref(), Some("texnomart.bitrix24.ru"));
    assert_eq!(status.details["portal"], "texnomart.bitrix24.ru");

    log.drain();
    let outcome = page.test().await.unwrap();
    assert!(!outcome.success);
    let notes = log.drain();
    assert_eq!(notes[0].level, NotificationLevel::Error);
    assert_eq!(notes[0].message, "Webhook lacks crm scope");

    page.disconnect().await.unwrap();
    assert!(!page.is_connected());
}

#[tokio::test]
async fn leads_load_filter_and_update() {
    let (base, fake) = start_server().await;
    let (backend, _session) = client(&base, Some(TOKEN)).await;
    let mut board = LeadBoard::new(backend, Arc::new(NotificationLog::new()));

    board.load().await.unwrap();
    assert_eq!(board.leads().len(), 2);
    let cold = LeadFilter {
        hotness: Some(Hotness::Cold),
        ..Default::default()
    };
    assert_eq!(board.filter(&cold)[0].name.as_deref(), Some("Malika"));

    board.update_status("1", LeadStatus::Won).await.unwrap();
    assert_eq!(board.leads()[0].status, LeadStatus::Won);
    assert!(board.update_status("404", LeadStatus::Lost).await.is_err());

    let updates = fake.recorded.lock().unwrap().lead_updates.clone();
    assert_eq!(updates, vec![("1".to_string(), json!({ "status": "won" }))]);
}
