//! Bounded retry decorator for any [`Provider`].
//!
//! Only `Timeout` and `Transport` failures are retried; backend and
//! configuration errors are returned immediately.

use async_trait::async_trait;
use sigma_core::{
    error::AiError,
    prompt::{AiResponse, PromptRequest},
    traits::Provider,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Wraps a provider and retries transient failures with exponential backoff.
pub struct RetryingProvider {
    inner: Arc<dyn Provider>,
    max_retries: u32,
    base_delay: Duration,
}

impl RetryingProvider {
    pub fn new(inner: Arc<dyn Provider>, max_retries: u32, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
        }
    }
}

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt-1)`,
/// capped at 32x the base.
pub fn retry_backoff(base: Duration, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(5);
    base * (1u32 << exponent)
}

#[async_trait]
impl Provider for RetryingProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(&self, request: &PromptRequest) -> Result<AiResponse, AiError> {
        let mut attempt = 0;
        loop {
            match self.inner.complete(request).await {
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = retry_backoff(self.base_delay, attempt);
                    warn!(
                        "{}: {} error, retry {attempt}/{} in {delay:?}: {e}",
                        self.inner.name(),
                        e.kind(),
                        self.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn is_available(&self) -> bool {
        self.inner.is_available().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigma_core::prompt::{PromptContent, TemplateId};
    use std::sync::Mutex;

    /// Replays a scripted sequence of results and counts calls.
    struct Scripted {
        results: Mutex<Vec<Result<AiResponse, AiError>>>,
        calls: Mutex<u32>,
    }

    impl Scripted {
        fn new(mut results: Vec<Result<AiResponse, AiError>>) -> Arc<Self> {
            results.reverse();
            Arc::new(Self {
                results: Mutex::new(results),
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Provider for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, _request: &PromptRequest) -> Result<AiResponse, AiError> {
            *self.calls.lock().unwrap() += 1;
            self.results
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(AiError::Transport("script exhausted".into())))
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    fn ok(text: &str) -> Result<AiResponse, AiError> {
        Ok(AiResponse {
            text: text.into(),
            ..Default::default()
        })
    }

    fn request() -> PromptRequest {
        PromptRequest {
            template: TemplateId::GeneralQuery,
            instruction: String::new(),
            content: PromptContent::Text("hi".into()),
            model: None,
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let base = Duration::from_millis(100);
        assert_eq!(retry_backoff(base, 1), Duration::from_millis(100));
        assert_eq!(retry_backoff(base, 2), Duration::from_millis(200));
        assert_eq!(retry_backoff(base, 3), Duration::from_millis(400));
        assert_eq!(retry_backoff(base, 6), Duration::from_millis(3200));
        assert_eq!(retry_backoff(base, 20), Duration::from_millis(3200));
    }

    #[tokio::test]
    async fn test_retries_timeout_then_succeeds() {
        let inner = Scripted::new(vec![
            Err(AiError::Timeout(1)),
            Err(AiError::Transport("reset".into())),
            ok("done"),
        ]);
        let p = RetryingProvider::new(inner.clone(), 2, Duration::from_millis(1));
        let resp = p.complete(&request()).await.unwrap();
        assert_eq!(resp.text, "done");
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let inner = Scripted::new(vec![
            Err(AiError::Timeout(1)),
            Err(AiError::Timeout(1)),
            Err(AiError::Timeout(1)),
            ok("too late"),
        ]);
        let p = RetryingProvider::new(inner.clone(), 2, Duration::from_millis(1));
        assert_eq!(p.complete(&request()).await.unwrap_err(), AiError::Timeout(1));
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test]
    async fn test_backend_error_not_retried() {
        let inner = Scripted::new(vec![
            Err(AiError::Backend {
                status: Some(400),
                detail: "bad request".into(),
            }),
            ok("unreachable"),
        ]);
        let p = RetryingProvider::new(inner.clone(), 3, Duration::from_millis(1));
        assert!(matches!(
            p.complete(&request()).await,
            Err(AiError::Backend { .. })
        ));
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn test_zero_retries_is_passthrough() {
        let inner = Scripted::new(vec![Err(AiError::Timeout(1)), ok("x")]);
        let p = RetryingProvider::new(inner.clone(), 0, Duration::from_millis(1));
        assert!(p.complete(&request()).await.is_err());
        assert_eq!(inner.calls(), 1);
        assert_eq!(p.name(), "scripted");
    }
}
