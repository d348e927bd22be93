//! Google Sheets spreadsheet URL handling.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

static SPREADSHEET_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/spreadsheets/d/([A-Za-z0-9_-]{10,})").unwrap());

/// Pull the spreadsheet id out of a share or edit URL.
pub fn spreadsheet_id(url: &str) -> Result<String, ValidationError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ValidationError::MissingField {
            field: "spreadsheet URL",
        });
    }
    SPREADSHEET_ID
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: "spreadsheet URL",
            reason: "expected a docs.google.com/spreadsheets/d/<id> link".to_string(),
        })
}
