//! Translation pipeline: prompt, generate, sanitize, validate, format

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::backend::TextGenerator;
use crate::core::client::GeminiClient;
use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{TranslationRequest, TranslationResult};
use crate::core::prompt::build_translation_prompt;
use crate::core::sanitizer::{format_document, sanitize, KeyDrift, KeyPath};

/// Translates the values of a JSON document through a text generation backend.
///
/// Cheap to clone; clones share the backend and configuration.
#[derive(Clone)]
pub struct JsonTranslator {
    backend: Arc<dyn TextGenerator>,
    timeout: Duration,
    enforce_key_match: bool,
}

impl JsonTranslator {
    /// Create a translator over any backend
    pub fn new(backend: Arc<dyn TextGenerator>, config: &TranslatorConfig) -> Self {
        Self {
            backend,
            timeout: config.timeout(),
            enforce_key_match: config.enforce_key_match,
        }
    }

    /// Create a translator backed by Gemini
    pub fn with_gemini(config: &TranslatorConfig) -> Result<Self> {
        let client = GeminiClient::new(config)?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// Model identifier of the backend
    pub fn model(&self) -> &str {
        self.backend.model()
    }

    /// Run the pipeline and return the pretty-printed translation.
    ///
    /// Errors keep their full detail for operators; use [`Self::run`] for the
    /// caller-facing result.
    pub async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        validate_request(request)?;

        let prompt = build_translation_prompt(&request.target_language, &request.source_document);
        debug!(
            "Prompt built for {} ({} bytes)",
            request.target_language,
            prompt.len()
        );

        let reply = match tokio::time::timeout(self.timeout, self.backend.generate(&prompt)).await {
            Ok(reply) => reply?,
            Err(_) => {
                return Err(TranslationError::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        };

        let document = sanitize(&reply)?;
        self.check_keys(request, document.json())?;

        format_document(&document)
    }

    /// Like [`Self::translate`], but gives up as soon as `cancel` completes.
    ///
    /// The in-flight backend call is dropped on cancellation.
    pub async fn translate_with_cancel<F>(
        &self,
        request: &TranslationRequest,
        cancel: F,
    ) -> Result<String>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                info!("Translation to {} cancelled", request.target_language);
                Err(TranslationError::Cancelled)
            }
            result = self.translate(request) => result,
        }
    }

    /// Run the pipeline and map any failure onto a generic caller result.
    ///
    /// Failure detail is logged here and never leaves this function.
    pub async fn run(&self, request: &TranslationRequest) -> TranslationResult {
        into_result(request, self.translate(request).await)
    }

    /// [`Self::run`] with cancellation
    pub async fn run_with_cancel<F>(&self, request: &TranslationRequest, cancel: F) -> TranslationResult
    where
        F: Future<Output = ()>,
    {
        into_result(request, self.translate_with_cancel(request, cancel).await)
    }

    fn check_keys(&self, request: &TranslationRequest, translated: &serde_json::Value) -> Result<()> {
        // The source is opaque to us; only compare when it happens to parse
        let Ok(source) = serde_json::from_str::<serde_json::Value>(&request.source_document) else {
            return Ok(());
        };

        let drift = KeyDrift::between(&source, translated);
        if drift.is_empty() {
            return Ok(());
        }

        warn!(
            "Key drift translating to {}: {} missing, {} extra (missing: [{}], extra: [{}])",
            request.target_language,
            drift.missing.len(),
            drift.extra.len(),
            join_paths(&drift.missing),
            join_paths(&drift.extra)
        );

        if self.enforce_key_match {
            return Err(TranslationError::MalformedReply {
                message: format!(
                    "key set differs from source ({} missing, {} extra)",
                    drift.missing.len(),
                    drift.extra.len()
                ),
            });
        }

        Ok(())
    }
}

impl std::fmt::Debug for JsonTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonTranslator")
            .field("model", &self.backend.model())
            .field("timeout", &self.timeout)
            .field("enforce_key_match", &self.enforce_key_match)
            .finish()
    }
}

fn join_paths(paths: &[KeyPath]) -> String {
    paths
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn validate_request(request: &TranslationRequest) -> Result<()> {
    if request.target_language.trim().is_empty() {
        return Err(TranslationError::InvalidRequest {
            message: "target language must not be empty".to_string(),
        });
    }

    if request.source_document.trim().is_empty() {
        return Err(TranslationError::InvalidRequest {
            message: "source document must not be empty".to_string(),
        });
    }

    Ok(())
}

fn into_result(request: &TranslationRequest, outcome: Result<String>) -> TranslationResult {
    match outcome {
        Ok(formatted_json) => {
            info!("Translated document to {}", request.target_language);
            TranslationResult::Success { formatted_json }
        }
        Err(e) => {
            warn!("Translation to {} failed: {}", request.target_language, e);
            let kind = e.kind().unwrap_or(crate::core::errors::ErrorKind::BackendUnavailable);
            TranslationResult::Failure { kind }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ErrorKind;
    use crate::core::models::GeneratedReply;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_err, assert_ok};

    enum Behavior {
        Reply(&'static str),
        Fail,
        Hang,
    }

    /// Backend double with a fixed behavior and a call counter
    struct FakeBackend {
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl FakeBackend {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for FakeBackend {
        async fn generate(&self, _prompt: &str) -> Result<GeneratedReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Reply(text) => Ok(GeneratedReply::new(text)),
                Behavior::Fail => Err(TranslationError::BackendUnavailable {
                    status: None,
                    message: "connection refused".to_string(),
                }),
                Behavior::Hang => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
            }
        }

        fn model(&self) -> &str {
            "fake-model"
        }
    }

    fn translator(backend: Arc<FakeBackend>) -> JsonTranslator {
        JsonTranslator::new(backend, &TranslatorConfig::new("test-key"))
    }

    #[tokio::test]
    async fn test_end_to_end_fenced_reply() {
        let backend = FakeBackend::new(Behavior::Reply("```json\n{\"hi\":\"hola\"}\n```"));
        let result = translator(backend.clone())
            .run(&TranslationRequest::new("es", "{\"hi\":\"hello\"}"))
            .await;

        assert_eq!(
            result,
            TranslationResult::Success {
                formatted_json: "{\n  \"hi\": \"hola\"\n}".to_string()
            }
        );
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_key_preserved_in_result() {
        let backend = FakeBackend::new(Behavior::Reply("{\"greeting\":\"bonjour\"}"));
        let formatted = assert_ok!(
            translator(backend)
                .translate(&TranslationRequest::new("French", "{\"greeting\":\"hello\"}"))
                .await
        );

        let value: serde_json::Value = serde_json::from_str(&formatted).unwrap();
        assert!(value.get("greeting").is_some());
    }

    #[tokio::test]
    async fn test_malformed_reply_is_not_partial_success() {
        let backend = FakeBackend::new(Behavior::Reply("Sure! Here's your translation: {broken"));
        let result = translator(backend)
            .run(&TranslationRequest::new("es", "{\"a\":\"b\"}"))
            .await;

        assert_eq!(result.error_kind(), Some(ErrorKind::MalformedReply));
        assert_eq!(result.formatted_json(), None);
    }

    #[tokio::test]
    async fn test_backend_failure_is_isolated() {
        let backend = FakeBackend::new(Behavior::Fail);
        let err = assert_err!(
            translator(backend.clone())
                .translate(&TranslationRequest::new("es", "{\"a\":\"b\"}"))
                .await
        );

        assert_eq!(err.kind(), Some(ErrorKind::BackendUnavailable));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_request_skips_backend() {
        let backend = FakeBackend::new(Behavior::Reply("{}"));
        let translator = translator(backend.clone());

        let result = translator.run(&TranslationRequest::new("  ", "{}")).await;
        assert_eq!(result.error_kind(), Some(ErrorKind::InvalidRequest));

        let result = translator.run(&TranslationRequest::new("es", "\n")).await;
        assert_eq!(result.error_kind(), Some(ErrorKind::InvalidRequest));

        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_source_document_is_not_validated() {
        let backend = FakeBackend::new(Behavior::Reply("{\"a\":\"b\"}"));
        let result = translator(backend)
            .run(&TranslationRequest::new("es", "{ a: 'not json' "))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_timeout() {
        let backend = FakeBackend::new(Behavior::Hang);
        let config = TranslatorConfig {
            timeout_ms: 50,
            ..TranslatorConfig::new("test-key")
        };
        let translator = JsonTranslator::new(backend, &config);

        let err = translator
            .translate(&TranslationRequest::new("es", "{}"))
            .await
            .unwrap_err();

        assert!(matches!(err, TranslationError::Timeout { timeout_ms: 50 }));
    }

    #[tokio::test]
    async fn test_cancellation_wins_over_pending_backend() {
        let backend = FakeBackend::new(Behavior::Hang);
        let result = translator(backend)
            .run_with_cancel(&TranslationRequest::new("es", "{}"), async {})
            .await;

        assert_eq!(result.error_kind(), Some(ErrorKind::Cancelled));
    }

    #[tokio::test]
    async fn test_uncancelled_request_completes() {
        let backend = FakeBackend::new(Behavior::Reply("[1, 2]"));
        let formatted = translator(backend)
            .translate_with_cancel(
                &TranslationRequest::new("es", "[1, 2]"),
                std::future::pending::<()>(),
            )
            .await
            .unwrap();

        assert_eq!(formatted, "[\n  1,\n  2\n]");
    }

    #[tokio::test]
    async fn test_key_drift_is_best_effort_by_default() {
        let backend = FakeBackend::new(Behavior::Reply("{\"saludo\":\"hola\"}"));
        let result = translator(backend)
            .run(&TranslationRequest::new("es", "{\"greeting\":\"hello\"}"))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_key_drift_rejected_when_enforced() {
        let backend = FakeBackend::new(Behavior::Reply("{\"saludo\":\"hola\"}"));
        let config = TranslatorConfig {
            enforce_key_match: true,
            ..TranslatorConfig::new("test-key")
        };
        let result = JsonTranslator::new(backend, &config)
            .run(&TranslationRequest::new("es", "{\"greeting\":\"hello\"}"))
            .await;

        assert_eq!(result.error_kind(), Some(ErrorKind::MalformedReply));
    }

    #[tokio::test]
    async fn test_dotted_key_reply_rejected_when_enforced() {
        let backend = FakeBackend::new(Behavior::Reply("{\"a\":\"y\",\"a.b\":\"z\"}"));
        let config = TranslatorConfig {
            enforce_key_match: true,
            ..TranslatorConfig::new("test-key")
        };
        let result = JsonTranslator::new(backend, &config)
            .run(&TranslationRequest::new("es", "{\"a\":{\"b\":\"x\"}}"))
            .await;

        assert_eq!(result.error_kind(), Some(ErrorKind::MalformedReply));
        assert_eq!(result.formatted_json(), None);
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_independent() {
        let backend = FakeBackend::new(Behavior::Reply("{\"k\":\"v\"}"));
        let translator = translator(backend.clone());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let translator = translator.clone();
                tokio::spawn(async move {
                    translator
                        .run(&TranslationRequest::new(format!("lang-{}", i), "{\"k\":\"x\"}"))
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
        assert_eq!(backend.calls(), 8);
    }

    #[test]
    fn test_debug_hides_backend_internals() {
        let translator = translator(FakeBackend::new(Behavior::Fail));
        let debug = format!("{:?}", translator);
        assert!(debug.contains("fake-model"));
        assert!(!debug.contains("test-key"));
    }
}
