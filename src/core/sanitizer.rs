//! Cleanup and strict validation of backend replies

use std::collections::BTreeSet;
use std::fmt;

use serde_json::Value;

use crate::core::errors::{Result, TranslationError};
use crate::core::models::{GeneratedReply, SanitizedDocument};

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Remove every markdown fence marker and trim surrounding whitespace
pub fn strip_fences(raw: &str) -> String {
    raw.replace(JSON_FENCE, "").replace(FENCE, "").trim().to_string()
}

/// Strip fences and parse the reply as JSON.
///
/// There is no best-effort recovery: anything `serde_json` rejects, including
/// an empty reply, is a `MalformedReply`.
pub fn sanitize(reply: &GeneratedReply) -> Result<SanitizedDocument> {
    let cleaned = strip_fences(&reply.raw_text);

    if cleaned.is_empty() {
        return Err(TranslationError::MalformedReply {
            message: "reply is empty after removing fences".to_string(),
        });
    }

    let json = serde_json::from_str::<Value>(&cleaned).map_err(|e| {
        TranslationError::MalformedReply {
            message: e.to_string(),
        }
    })?;

    Ok(SanitizedDocument { json })
}

/// Pretty-print with two-space indentation, keys in received order
pub fn format_document(document: &SanitizedDocument) -> Result<String> {
    serde_json::to_string_pretty(document.json()).map_err(|e| TranslationError::MalformedReply {
        message: e.to_string(),
    })
}

/// One step into a JSON value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of an object key, kept as segments so a literal `"a.b"` key
/// never equals the nested path `a` then `b`
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyPath(pub Vec<PathSegment>);

impl KeyPath {
    fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        KeyPath(segments)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
                PathSegment::Key(key) if is_plain_key(key) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", key)?;
                }
                // Quoted form for keys that would read as separators
                PathSegment::Key(key) => write!(f, "[{}]", Value::String(key.clone()))?,
            }
        }
        Ok(())
    }
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(['.', '[', ']', '"'])
}

/// Every object key path in `value`, displayed like `menu.items[0].label`
pub fn key_paths(value: &Value) -> BTreeSet<KeyPath> {
    let mut paths = BTreeSet::new();
    collect_paths(value, &KeyPath::default(), &mut paths);
    paths
}

fn collect_paths(value: &Value, prefix: &KeyPath, paths: &mut BTreeSet<KeyPath>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = prefix.child(PathSegment::Key(key.clone()));
                collect_paths(child, &path, paths);
                paths.insert(path);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                collect_paths(child, &prefix.child(PathSegment::Index(i)), paths);
            }
        }
        _ => {}
    }
}

/// Key paths missing from and added to `translated`, relative to `source`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KeyDrift {
    pub missing: Vec<KeyPath>,
    pub extra: Vec<KeyPath>,
}

impl KeyDrift {
    pub fn between(source: &Value, translated: &Value) -> Self {
        let source = key_paths(source);
        let translated = key_paths(translated);

        Self {
            missing: source.difference(&translated).cloned().collect(),
            extra: translated.difference(&source).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}
