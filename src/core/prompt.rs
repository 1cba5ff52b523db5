//! Prompt construction for JSON value translation

use crate::core::models::find_language;

/// Build the single instruction sent to the backend.
///
/// Catalog ids are expanded to their English name (`es` becomes
/// `Spanish (es)`); anything else is passed through as given.
pub fn build_translation_prompt(target_language: &str, source_document: &str) -> String {
    format!(
        "Translate the following JSON to {}. \
         Only translate the values, not the keys; every key must stay exactly as it is. \
         Return only valid JSON, without any additional text, explanation, formatting or markdown code fences: {}",
        describe_language(target_language),
        source_document
    )
}

fn describe_language(target_language: &str) -> String {
    let target_language = target_language.trim();
    match find_language(target_language) {
        Some(lang) if lang.id.eq_ignore_ascii_case(target_language) => {
            format!("{} ({})", lang.name, lang.id)
        }
        _ => target_language.to_string(),
    }
}
