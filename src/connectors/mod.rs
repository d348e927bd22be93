//! Channel and CRM connector pages.

pub mod bitrix;
pub mod google_sheets;
pub mod page;
pub mod telegram;

pub use page::ConnectorPage;
pub use telegram::TelegramBot;

use crate::api::Backend;
use crate::error::Result;
use crate::models::IntegrationsStatus;

/// Dashboard "connections" view: every channel's state in one call.
pub async fn integrations_overview(backend: &dyn Backend) -> Result<IntegrationsStatus> {
    let status = backend.integrations_status().await?;
    tracing::debug!(connected = ?status.connected(), "Integrations status loaded");
    Ok(status)
}
