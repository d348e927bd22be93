//! Connector page — status/connect/test/disconnect lifecycle for one CRM.
//!
//! The page holds no state of its own beyond the last status document the
//! backend returned. Every state-changing action is followed by a fresh
//! status fetch, so what the page shows is always what the backend says.

use std::sync::Arc;

use tracing::{info, warn};

use super::{bitrix, google_sheets};
use crate::api::{Backend, ConnectRequest, ConnectorKind, ConnectorTestOutcome};
use crate::error::{Error, Result, ValidationError};
use crate::models::{ChannelConnection, ChannelKind, ConnectorStatus};
use crate::notify::{Notification, Notifier};

impl From<ConnectorKind> for ChannelKind {
    fn from(kind: ConnectorKind) -> Self {
        match kind {
            ConnectorKind::Bitrix24 => Self::Bitrix24,
            ConnectorKind::Zoho => Self::Zoho,
            ConnectorKind::GoogleSheets => Self::GoogleSheets,
        }
    }
}

pub struct ConnectorPage {
    kind: ConnectorKind,
    backend: Arc<dyn Backend>,
    notifier: Arc<dyn Notifier>,
    status: Option<ConnectorStatus>,
}

impl ConnectorPage {
    /// Open the page and fetch its status. A failed fetch leaves the page
    /// in the disconnected view with an error notification.
    pub async fn mount(
        kind: ConnectorKind,
        backend: Arc<dyn Backend>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let mut page = Self {
            kind,
            backend,
            notifier,
            status: None,
        };
        // reload() already reports the failure.
        let _ = page.reload().await;
        page
    }

    pub fn kind(&self) -> ConnectorKind {
        self.kind
    }

    /// Last status fetched, `None` if the fetch never succeeded.
    pub fn status(&self) -> Option<&ConnectorStatus> {
        self.status.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.connected)
    }

    pub fn connection(&self) -> ChannelConnection {
        match &self.status {
            Some(status) => ChannelConnection::from_status(self.kind.into(), status),
            None => ChannelConnection::new(self.kind.into()),
        }
    }

    /// Re-derive the page state from the backend. A failed fetch is
    /// notified and keeps the previous status.
    pub async fn reload(&mut self) -> Result<&ConnectorStatus> {
        match self.backend.connector_status(self.kind).await {
            Ok(status) => {
                info!(connector = %self.kind, connected = status.connected, "Connector status loaded");
                Ok(self.status.insert(status))
            }
            Err(e) => {
                warn!(connector = %self.kind, error = %e, "Connector status fetch failed");
                self.notifier.notify(Notification::error(e.user_message()));
                Err(e.into())
            }
        }
    }

    /// Reload, then report whether the backend now shows `connected`.
    async fn confirm(&mut self, connected: bool, done: &str) -> Result<()> {
        let name = self.kind.display_name();
        if self.reload().await?.connected == connected {
            self.notifier
                .notify(Notification::success(format!("{name} {done}")));
        } else {
            warn!(connector = %self.kind, expected = connected, "Status did not change after action");
            self.notifier.notify(Notification::warning(format!(
                "{name} accepted the request but its status has not changed yet"
            )));
        }
        Ok(())
    }

    /// Submit credentials, then reload status.
    pub async fn connect(&mut self, request: ConnectRequest) -> Result<()> {
        if let Err(e) = self.check_request(&request) {
            self.notifier.notify(Notification::warning(e.to_string()));
            return Err(e.into());
        }

        if let Err(e) = self.backend.connector_connect(&request).await {
            warn!(connector = %self.kind, error = %e, "Connector connect failed");
            self.notifier.notify(Notification::error(e.user_message()));
            return Err(e.into());
        }

        self.confirm(true, "connected").await
    }

    fn check_request(&self, request: &ConnectRequest) -> std::result::Result<(), ValidationError> {
        if request.kind() != self.kind {
            return Err(ValidationError::InvalidFormat {
                field: "credentials",
                reason: format!("not valid for {}", self.kind.display_name()),
            });
        }
        match request {
            ConnectRequest::BitrixWebhook { webhook_url } => {
                bitrix::parse_webhook_url(webhook_url).map(|_| ())
            }
            ConnectRequest::GoogleSheet { spreadsheet_url } => {
                google_sheets::spreadsheet_id(spreadsheet_url).map(|_| ())
            }
        }
    }

    /// Zoho: fetch the consent URL the user must open. The backend finishes
    /// the code exchange; call `reload` once the user comes back.
    pub async fn begin_oauth(&self) -> Result<String> {
        if self.kind != ConnectorKind::Zoho {
            return Err(Error::Validation(ValidationError::InvalidFormat {
                field: "connector",
                reason: format!("{} does not use OAuth", self.kind.display_name()),
            }));
        }
        match self.backend.zoho_auth_url().await {
            Ok(url) => {
                self.notifier.notify(Notification::info(
                    "Finish signing in to Zoho in the browser, then reload this page",
                ));
                Ok(url)
            }
            Err(e) => {
                self.notifier.notify(Notification::error(e.user_message()));
                Err(e.into())
            }
        }
    }

    /// Google Sheets: the service-account address to share the sheet with.
    pub async fn service_email(&self) -> Result<String> {
        if self.kind != ConnectorKind::GoogleSheets {
            return Err(Error::Validation(ValidationError::InvalidFormat {
                field: "connector",
                reason: format!("{} has no service account", self.kind.display_name()),
            }));
        }
        match self.backend.google_service_email().await {
            Ok(email) => Ok(email),
            Err(e) => {
                self.notifier.notify(Notification::error(e.user_message()));
                Err(e.into())
            }
        }
    }

    /// Ask the backend to exercise the connection.
    pub async fn test(&self) -> Result<ConnectorTestOutcome> {
        match self.backend.connector_test(self.kind).await {
            Ok(outcome) => {
                let text = outcome.message.clone().unwrap_or_else(|| {
                    format!("{} connection works", self.kind.display_name())
                });
                if outcome.success {
                    self.notifier.notify(Notification::success(text));
                } else {
                    self.notifier.notify(Notification::error(text));
                }
                Ok(outcome)
            }
            Err(e) => {
                warn!(connector = %self.kind, error = %e, "Connector test failed");
                self.notifier.notify(Notification::error(e.user_message()));
                Err(e.into())
            }
        }
    }

    pub async fn disconnect(&mut self) -> Result<()> {
        if let Err(e) = self.backend.connector_disconnect(self.kind).await {
            warn!(connector = %self.kind, error = %e, "Connector disconnect failed");
            self.notifier.notify(Notification::error(e.user_message()));
            return Err(e.into());
        }
        self.confirm(false, "disconnected").await
    }
}
