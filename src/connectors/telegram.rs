//! Telegram bot hookup for the Connect step.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::api::Backend;
use crate::error::{Result, ValidationError};
use crate::models::{ChannelConnection, ChannelKind, ConnectorStatus};
use crate::notify::{Notification, Notifier};

/// BotFather token: numeric bot id, colon, secret.
static BOT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5,}:[A-Za-z0-9_-]{35,}$").unwrap());

pub fn validate_bot_token(token: &str) -> std::result::Result<(), ValidationError> {
    if token.trim().is_empty() {
        return Err(ValidationError::MissingField { field: "bot token" });
    }
    if !BOT_TOKEN.is_match(token.trim()) {
        return Err(ValidationError::InvalidFormat {
            field: "bot token",
            reason: "expected the token from @BotFather, like 123456789:ABC...".to_string(),
        });
    }
    Ok(())
}

/// The tenant's Telegram bot connection.
#[derive(Debug, Clone)]
pub struct TelegramBot {
    connection: ChannelConnection,
}

impl Default for TelegramBot {
    fn default() -> Self {
        Self {
            connection: ChannelConnection::new(ChannelKind::Telegram),
        }
    }
}

impl TelegramBot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from `/api/integrations/status`.
    pub fn from_status(status: &ConnectorStatus) -> Self {
        Self {
            connection: ChannelConnection::from_status(ChannelKind::Telegram, status),
        }
    }

    pub fn connection(&self) -> &ChannelConnection {
        &self.connection
    }

    pub fn username(&self) -> Option<&str> {
        self.connection.identifier()
    }

    /// Submit a bot token. The connection ends up connected or failed,
    /// depending only on the backend's answer.
    pub async fn connect(
        &mut self,
        backend: &dyn Backend,
        notifier: &dyn Notifier,
        token: &str,
    ) -> Result<()> {
        if let Err(e) = validate_bot_token(token) {
            notifier.notify(Notification::warning(e.to_string()));
            return Err(e.into());
        }

        self.connection.begin();
        match backend.connect_telegram_bot(token.trim()).await {
            Ok(username) => {
                info!(bot = %username, "Telegram bot connected");
                notifier.notify(Notification::success(format!("Connected @{username}")));
                self.connection.succeed(Some(username));
                Ok(())
            }
            Err(e) => {
                let message = e.user_message();
                warn!(error = %e, "Telegram bot connection failed");
                notifier.notify(Notification::error(message.clone()));
                self.connection.fail(message);
                Err(e.into())
            }
        }
    }

    pub async fn disconnect(&mut self, backend: &dyn Backend, notifier: &dyn Notifier) -> Result<()> {
        match backend.disconnect_telegram_bot().await {
            Ok(()) => {
                info!("Telegram bot disconnected");
                notifier.notify(Notification::success("Telegram bot disconnected"));
                self.connection.disconnect();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Telegram bot disconnect failed");
                notifier.notify(Notification::error(e.user_message()));
                Err(e.into())
            }
        }
    }
}
