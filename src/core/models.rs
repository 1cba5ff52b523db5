//! Core data models for translation

use serde::{Deserialize, Serialize};

use crate::core::errors::ErrorKind;

/// One caller's translation job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub target_language: String,
    /// Opaque JSON text, embedded into the prompt verbatim
    pub source_document: String,
}

impl TranslationRequest {
    pub fn new(target_language: impl Into<String>, source_document: impl Into<String>) -> Self {
        Self {
            target_language: target_language.into(),
            source_document: source_document.into(),
        }
    }
}

/// Unprocessed backend text for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReply {
    pub raw_text: String,
}

impl GeneratedReply {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
        }
    }
}

/// A reply that has passed fence stripping and a strict JSON parse.
///
/// Only [`crate::core::sanitizer::sanitize`] constructs one, so holding a
/// value means parsing succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedDocument {
    pub(crate) json: serde_json::Value,
}

impl SanitizedDocument {
    /// Parsed value
    pub fn json(&self) -> &serde_json::Value {
        &self.json
    }

    pub fn into_json(self) -> serde_json::Value {
        self.json
    }
}

/// Terminal value handed back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TranslationResult {
    /// Pretty-printed, two-space indented JSON
    Success { formatted_json: String },
    Failure { kind: ErrorKind },
}

impl TranslationResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, TranslationResult::Success { .. })
    }

    /// Translated JSON, absent on failure
    pub fn formatted_json(&self) -> Option<&str> {
        match self {
            TranslationResult::Success { formatted_json } => Some(formatted_json),
            TranslationResult::Failure { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            TranslationResult::Success { .. } => None,
            TranslationResult::Failure { kind } => Some(*kind),
        }
    }

    /// Text for the `message` field of the HTTP response
    pub fn message(&self) -> &str {
        match self {
            TranslationResult::Success { formatted_json } => formatted_json,
            TranslationResult::Failure { kind } => kind.user_message(),
        }
    }
}

/// Language offered in the picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
}

/// Languages offered to UI callers. The translator accepts any other name too.
pub const LANGUAGES: &[Language] = &[
    Language { id: "en", name: "English", icon: "🇬🇧" },
    Language { id: "es", name: "Spanish", icon: "🇪🇸" },
    Language { id: "de", name: "German", icon: "🇩🇪" },
    Language { id: "fr", name: "French", icon: "🇫🇷" },
    Language { id: "ja", name: "Japanese", icon: "🇯🇵" },
    Language { id: "ko", name: "Korean", icon: "🇰🇷" },
    Language { id: "zh", name: "Chinese", icon: "🇨🇳" },
    Language { id: "it", name: "Italian", icon: "🇮🇹" },
    Language { id: "ar", name: "Arabic", icon: "🇸🇦" },
    Language { id: "pl", name: "Polish", icon: "🇵🇱" },
    Language { id: "nl", name: "Dutch", icon: "🇳🇱" },
    Language { id: "hi", name: "Hindi", icon: "🇮🇳" },
    Language { id: "pt", name: "Portuguese", icon: "🇵🇹" },
    Language { id: "ru", name: "Russian", icon: "🇷🇺" },
];

/// Look up a catalog entry by id or name, case-insensitively
pub fn find_language(query: &str) -> Option<&'static Language> {
    let query = query.trim();
    LANGUAGES
        .iter()
        .find(|l| l.id.eq_ignore_ascii_case(query) || l.name.eq_ignore_ascii_case(query))
}
