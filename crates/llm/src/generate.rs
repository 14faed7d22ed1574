use crate::error::Result;
use async_trait::async_trait;

/// A text-generation capability: one prompt in, one completion out.
///
/// Implemented by the HTTP-backed [`crate::OpenAiGenerator`] in production
/// and by in-memory mocks in tests.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
