//! Business profile collected on the first wizard step.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// What the agent is selling and for whom.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessInfo {
    #[serde(rename = "business_name", deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(rename = "business_description", deserialize_with = "super::null_as_default")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products_services: Option<String>,
}

impl BusinessInfo {
    /// Name and description must both contain something other than whitespace.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "business name",
            });
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "business description",
            });
        }
        Ok(())
    }

    /// Copy with surrounding whitespace removed and a blank products field dropped.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            products_services: self
                .products_services
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
        }
    }
}
