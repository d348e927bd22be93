//! Agent behaviour settings collected on the Settings wizard step.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const MAX_RESPONSE_DELAY_SECONDS: u32 = 60;
pub const MAX_MESSAGES_PER_MINUTE: u32 = 60;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Friendly,
    Professional,
    Casual,
    Formal,
}

/// Languages the agent can converse in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Uz,
    Ru,
    En,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Uz => "uz",
            Self::Ru => "ru",
            Self::En => "en",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmojiUsage {
    None,
    #[default]
    Minimal,
    Moderate,
    Frequent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseLength {
    Short,
    #[default]
    Medium,
    Long,
}

/// How the sales agent talks and what it tries to collect from a lead.
///
/// `primary_language` is never contained in `secondary_languages`; the
/// language setters below keep that true, and `validate` checks it for
/// values that came from elsewhere (e.g. a deserialized config).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SettingsPayload")]
pub struct AgentSettings {
    pub tone: Tone,
    pub primary_language: Language,
    pub secondary_languages: BTreeSet<Language>,
    pub emoji_usage: EmojiUsage,
    pub response_length: ResponseLength,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeting_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_message: Option<String>,
    pub min_response_delay_seconds: u32,
    pub max_messages_per_minute: u32,
    pub collect_name: bool,
    pub collect_phone: bool,
    pub collect_product: bool,
    pub collect_budget: bool,
    pub collect_location: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            tone: Tone::default(),
            primary_language: Language::Ru,
            secondary_languages: BTreeSet::new(),
            emoji_usage: EmojiUsage::default(),
            response_length: ResponseLength::default(),
            greeting_message: None,
            closing_message: None,
            min_response_delay_seconds: 2,
            max_messages_per_minute: 10,
            collect_name: true,
            collect_phone: true,
            collect_product: true,
            collect_budget: false,
            collect_location: false,
        }
    }
}

/// Incoming settings. A field that is absent or `null` keeps its default.
#[derive(Deserialize, Default)]
#[serde(default)]
struct SettingsPayload {
    tone: Option<Tone>,
    primary_language: Option<Language>,
    secondary_languages: Option<BTreeSet<Language>>,
    emoji_usage: Option<EmojiUsage>,
    response_length: Option<ResponseLength>,
    greeting_message: Option<String>,
    closing_message: Option<String>,
    min_response_delay_seconds: Option<u32>,
    max_messages_per_minute: Option<u32>,
    collect_name: Option<bool>,
    collect_phone: Option<bool>,
    collect_product: Option<bool>,
    collect_budget: Option<bool>,
    collect_location: Option<bool>,
}

impl From<SettingsPayload> for AgentSettings {
    fn from(p: SettingsPayload) -> Self {
        let d = Self::default();
        Self {
            tone: p.tone.unwrap_or(d.tone),
            primary_language: p.primary_language.unwrap_or(d.primary_language),
            secondary_languages: p.secondary_languages.unwrap_or(d.secondary_languages),
            emoji_usage: p.emoji_usage.unwrap_or(d.emoji_usage),
            response_length: p.response_length.unwrap_or(d.response_length),
            greeting_message: p.greeting_message,
            closing_message: p.closing_message,
            min_response_delay_seconds: p
                .min_response_delay_seconds
                .unwrap_or(d.min_response_delay_seconds),
            max_messages_per_minute: p
                .max_messages_per_minute
                .unwrap_or(d.max_messages_per_minute),
            collect_name: p.collect_name.unwrap_or(d.collect_name),
            collect_phone: p.collect_phone.unwrap_or(d.collect_phone),
            collect_product: p.collect_product.unwrap_or(d.collect_product),
            collect_budget: p.collect_budget.unwrap_or(d.collect_budget),
            collect_location: p.collect_location.unwrap_or(d.collect_location),
        }
    }
}

impl AgentSettings {
    /// Change the primary language, dropping it from the secondaries if present.
    pub fn set_primary_language(&mut self, language: Language) {
        self.secondary_languages.remove(&language);
        self.primary_language = language;
    }

    /// Add a secondary language. Rejected when it is the current primary.
    ///
    /// Returns `false` if the language was already selected.
    pub fn add_secondary_language(&mut self, language: Language) -> Result<bool, ValidationError> {
        if language == self.primary_language {
            return Err(ValidationError::LanguageConflict {
                language: language.to_string(),
            });
        }
        Ok(self.secondary_languages.insert(language))
    }

    pub fn remove_secondary_language(&mut self, language: Language) -> bool {
        self.secondary_languages.remove(&language)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.secondary_languages.contains(&self.primary_language) {
            return Err(ValidationError::LanguageConflict {
                language: self.primary_language.to_string(),
            });
        }
        if self.min_response_delay_seconds > MAX_RESPONSE_DELAY_SECONDS {
            return Err(ValidationError::OutOfRange {
                field: "min_response_delay_seconds",
                message: format!(
                    "{} > {MAX_RESPONSE_DELAY_SECONDS}",
                    self.min_response_delay_seconds
                ),
            });
        }
        if self.max_messages_per_minute == 0
            || self.max_messages_per_minute > MAX_MESSAGES_PER_MINUTE
        {
            return Err(ValidationError::OutOfRange {
                field: "max_messages_per_minute",
                message: format!(
                    "{} not in 1..={MAX_MESSAGES_PER_MINUTE}",
                    self.max_messages_per_minute
                ),
            });
        }
        Ok(())
    }
}
