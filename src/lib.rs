//! JSON i18n Translator - translates the values of JSON documents with a
//! generative text backend while keeping every key intact.
//!
//! The library exposes the translation pipeline ([`JsonTranslator`]), the
//! Gemini backend and an axum HTTP surface.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod core;
pub mod server;

// Re-export key types for convenience
pub use core::{
    backend::TextGenerator,
    client::GeminiClient,
    config::TranslatorConfig,
    errors::{ErrorKind, TranslationError},
    models::{GeneratedReply, SanitizedDocument, TranslationRequest, TranslationResult},
    orchestrator::JsonTranslator,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
