//! Text generation backend interface

use async_trait::async_trait;

use crate::core::errors::Result;
use crate::core::models::GeneratedReply;

/// Single-shot text generation.
///
/// Implementations return `BackendUnavailable` for anything that prevents a
/// reply from arriving. The reply text itself is untrusted.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for one prompt
    async fn generate(&self, prompt: &str) -> Result<GeneratedReply>;

    /// Model identifier used for generation
    fn model(&self) -> &str;
}
