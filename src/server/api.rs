//! HTTP API server implementation

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::core::errors::ErrorKind;
use crate::core::models::{Language, TranslationRequest, LANGUAGES};
use crate::core::orchestrator::JsonTranslator;

/// Upload cap for source documents
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Application state
#[derive(Clone)]
pub struct AppState {
    translator: JsonTranslator,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
    model: String,
}

/// Languages list response
#[derive(Serialize)]
struct LanguagesResponse {
    data: &'static [Language],
}

/// Translation request body sent by the UI
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateBody {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub original_json: String,
}

/// Response body on both success and failure
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Health check handler
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.translator.model().to_string(),
    })
}

/// Get languages handler
async fn get_languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse { data: LANGUAGES })
}

/// Translation handler.
///
/// The body is parsed by hand so clients that omit `Content-Type`
/// (a bare `fetch` with a string body sends `text/plain`) are still served.
async fn translate(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> (StatusCode, Json<MessageResponse>) {
    // Oversized bodies keep their 413 but still get the JSON shape
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!("Rejected translation request body: {}", rejection.body_text());
            let (_, message) = failure(ErrorKind::InvalidRequest);
            return (rejection.status(), message);
        }
    };

    let payload: TranslateBody = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Rejected translation request body: {}", e);
            return failure(ErrorKind::InvalidRequest);
        }
    };

    let request = TranslationRequest::new(payload.language, payload.original_json);
    let result = state.translator.run(&request).await;

    match result.error_kind() {
        None => (
            StatusCode::OK,
            Json(MessageResponse {
                message: result.message().to_string(),
            }),
        ),
        Some(kind) => failure(kind),
    }
}

fn failure(kind: ErrorKind) -> (StatusCode, Json<MessageResponse>) {
    let status =
        StatusCode::from_u16(kind.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(MessageResponse {
            message: kind.user_message().to_string(),
        }),
    )
}

/// Build the application router
pub fn router(translator: JsonTranslator) -> Router {
    let state = Arc::new(AppState { translator });

    Router::new()
        .route("/", get(health_check))
        .route("/api/languages", get(get_languages))
        .route("/api/translate", post(translate))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(host: String, port: u16, translator: JsonTranslator) -> anyhow::Result<()> {
    let app = router(translator);

    // Bind address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::TextGenerator;
    use crate::core::config::TranslatorConfig;
    use crate::core::errors::{Result, TranslationError};
    use crate::core::models::GeneratedReply;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    struct FixedBackend(Option<&'static str>);

    #[async_trait]
    impl TextGenerator for FixedBackend {
        async fn generate(&self, _prompt: &str) -> Result<GeneratedReply> {
            match self.0 {
                Some(text) => Ok(GeneratedReply::new(text)),
                None => Err(TranslationError::BackendUnavailable {
                    status: Some(500),
                    message: "Internal error encountered. trace=abc123".to_string(),
                }),
            }
        }

        fn model(&self) -> &str {
            "fixed"
        }
    }

    fn app(reply: Option<&'static str>) -> Router {
        let translator =
            JsonTranslator::new(Arc::new(FixedBackend(reply)), &TranslatorConfig::new("k"));
        router(translator)
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_translate(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/translate")
            .header("content-type", "text/plain;charset=UTF-8")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_translate_success() {
        let body = r#"{"language":"es","originalJson":"{\"hi\":\"hello\"}"}"#;
        let (status, json) = call(app(Some("```json\n{\"hi\":\"hola\"}\n```")), post_translate(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "{\n  \"hi\": \"hola\"\n}");
    }

    #[tokio::test]
    async fn test_translate_backend_failure_is_generic() {
        let body = r#"{"language":"es","originalJson":"{}"}"#;
        let (status, json) = call(app(None), post_translate(body)).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["message"], "Error translating JSON");
        assert!(!json.to_string().contains("trace=abc123"));
    }

    #[tokio::test]
    async fn test_translate_malformed_reply() {
        let body = r#"{"language":"es","originalJson":"{}"}"#;
        let (status, json) = call(app(Some("I cannot do that")), post_translate(body)).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["message"], ErrorKind::MalformedReply.user_message());
    }

    #[tokio::test]
    async fn test_translate_bad_body() {
        let (status, json) = call(app(Some("{}")), post_translate("not json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], ErrorKind::InvalidRequest.user_message());
    }

    #[tokio::test]
    async fn test_translate_oversized_body_keeps_message_shape() {
        let body = "x".repeat(MAX_BODY_BYTES + 1);
        let (status, json) = call(app(Some("{}")), post_translate(&body)).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json["message"], ErrorKind::InvalidRequest.user_message());
    }

    #[tokio::test]
    async fn test_translate_missing_language() {
        let (status, _) = call(app(Some("{}")), post_translate(r#"{"originalJson":"{}"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health_and_languages() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (status, json) = call(app(None), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["model"], "fixed");

        let request = Request::builder()
            .uri("/api/languages")
            .body(Body::empty())
            .unwrap();
        let (status, json) = call(app(None), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().map(|a| a.len()), Some(14));
        assert_eq!(json["data"][1]["id"], "es");
    }
}
