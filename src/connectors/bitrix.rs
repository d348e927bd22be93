//! Bitrix24 inbound-webhook checks.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

/// `https://<portal>/rest/<user id>/<token>/`
static WEBHOOK_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://(?P<portal>[A-Za-z0-9.-]+\.[A-Za-z]{2,})/rest/\d+/[A-Za-z0-9]+/?$").unwrap()
});

/// Check the webhook URL shape and return the portal domain.
pub fn parse_webhook_url(url: &str) -> Result<String, ValidationError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ValidationError::MissingField {
            field: "webhook URL",
        });
    }
    WEBHOOK_URL
        .captures(url)
        .and_then(|c| c.name("portal"))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: "webhook URL",
            reason: "expected https://<portal>/rest/<user_id>/<token>/".to_string(),
        })
}
