use crate::cache::ResponseCache;
use crate::error::Result;
use crate::generate::TextGenerator;
use crate::retry::{with_retries, RetryOutcome, RetryPolicy};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Explicit per-run context holding the generation capability, the optional
/// response cache, and the retry policy. Passed to every pipeline stage
/// that talks to the model.
pub struct LlmContext {
    generator: Arc<dyn TextGenerator>,
    cache: Option<Mutex<ResponseCache>>,
    policy: RetryPolicy,
}

impl LlmContext {
    pub fn new(generator: Arc<dyn TextGenerator>, policy: RetryPolicy) -> Self {
        Self {
            generator,
            cache: None,
            policy,
        }
    }

    /// Attach a file-backed response cache.
    #[must_use]
    pub fn with_cache(mut self, path: impl AsRef<Path>) -> Self {
        self.cache = Some(Mutex::new(ResponseCache::load(path)));
        self
    }

    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Generate a completion for `prompt`.
    ///
    /// The cache is consulted only on the first attempt (`attempt == 0`):
    /// a retry means the cached response failed validation downstream, so
    /// it must not be served again.
    pub async fn generate(&self, prompt: &str, attempt: u32) -> Result<String> {
        if attempt == 0 {
            if let Some(cache) = &self.cache {
                let guard = cache.lock().unwrap_or_else(|e| e.into_inner());
                if let Some(hit) = guard.get(prompt) {
                    log::debug!("Cache hit ({} chars)", hit.len());
                    return Ok(hit.to_string());
                }
            }
        }

        let response = self.generator.generate(prompt).await?;

        if let Some(cache) = &self.cache {
            let mut guard = cache.lock().unwrap_or_else(|e| e.into_inner());
            guard.put(prompt, &response);
            if let Err(err) = guard.persist() {
                log::warn!("Failed to persist response cache: {err}");
            }
        }

        Ok(response)
    }

    /// Generate with the context's retry policy.
    pub async fn generate_with_retries(&self, prompt: &str) -> RetryOutcome<String> {
        with_retries(self.policy, move |attempt| self.generate(prompt, attempt)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct CountingGenerator {
        calls: AtomicU32,
    }

    #[async_trait]
    impl TextGenerator for CountingGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("echo: {prompt}"))
        }
    }

    #[tokio::test]
    async fn first_attempt_hits_cache_retry_bypasses_it() {
        let dir = tempfile::tempdir().unwrap();
        let generator = Arc::new(CountingGenerator {
            calls: AtomicU32::new(0),
        });
        let ctx = LlmContext::new(
            generator.clone(),
            RetryPolicy {
                max_attempts: 1,
                wait: Duration::from_millis(1),
            },
        )
        .with_cache(dir.path().join("cache.json"));

        let first = ctx.generate("hello", 0).await.unwrap();
        assert_eq!(first, "echo: hello");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);

        // Same prompt, attempt 0: served from cache.
        let second = ctx.generate("hello", 0).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);

        // Retry attempt: cache bypassed.
        let third = ctx.generate("hello", 1).await.unwrap();
        assert_eq!(third, first);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
    }
}
