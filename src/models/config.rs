//! Tenant agent configuration as stored by the backend.

use serde::{Deserialize, Serialize};

use super::business::BusinessInfo;
use super::document::Document;
use super::settings::AgentSettings;

/// `GET /api/config` document. Every section falls back to its default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RemoteConfig {
    #[serde(flatten)]
    pub business: BusinessInfo,
    #[serde(flatten)]
    pub settings: AgentSettings,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub documents: Vec<Document>,
}

/// `PUT /api/config` body. Each wizard step sends only its own section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigUpdate {
    Business(BusinessInfo),
    Settings(AgentSettings),
}

impl ConfigUpdate {
    pub fn section(&self) -> &'static str {
        match self {
            Self::Business(_) => "business",
            Self::Settings(_) => "settings",
        }
    }
}
