//! Image editor trait and retry policy.

use crate::error::{Result, SceneGenError};
use crate::image::types::{EditRequest, EditedImage};
use async_trait::async_trait;
use std::time::Duration;

/// Trait for image editing backends.
#[async_trait]
pub trait ImageEditor: Send + Sync {
    /// Performs a single edit attempt.
    async fn edit(&self, request: &EditRequest) -> Result<EditedImage>;

    /// Returns the name of this editor for display.
    fn name(&self) -> &str;

    /// Checks if the backend is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}

/// Exponential backoff applied to rate-limited requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry. Doubles on each retry after that.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given attempt budget and first delay.
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
        }
    }

    /// Delay before retry number `retry` (zero-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(retry))
    }
}

/// Extension trait for editors with retry logic.
#[async_trait]
pub trait ImageEditorExt: ImageEditor {
    /// Edits with backoff on rate limits. Other errors return immediately.
    async fn edit_with_retries(
        &self,
        request: &EditRequest,
        policy: &RetryPolicy,
    ) -> Result<EditedImage> {
        let max_attempts = policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            tracing::info!(attempt, max_attempts, editor = self.name(), "sending edit request");
            match self.edit(request).await {
                Ok(image) => return Ok(image),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = policy.delay_for(attempt - 1);
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_secs = delay.as_secs_f64(),
                        "retrying after {e}"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) if e.is_retryable() => {
                    tracing::error!(attempts = max_attempts, "giving up: {e}");
                }
                Err(e) => return Err(e),
            }
        }

        Err(SceneGenError::RetriesExhausted {
            attempts: max_attempts,
        })
    }
}

impl<T: ImageEditor> ImageEditorExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::types::ImageFormat;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Replays scripted outcomes, one per attempt.
    struct ScriptedEditor {
        outcomes: Mutex<VecDeque<Result<EditedImage>>>,
        calls: Mutex<Vec<Instant>>,
    }

    impl ScriptedEditor {
        fn new(outcomes: Vec<Result<EditedImage>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageEditor for ScriptedEditor {
        async fn edit(&self, _request: &EditRequest) -> Result<EditedImage> {
            self.calls.lock().unwrap().push(Instant::now());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(SceneGenError::RateLimited))
        }

        fn name(&self) -> &str {
            "scripted"
        }

        async fn health_check(&self) -> Result<()> {
            Ok(())
        }
    }

    fn assert_close(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual <= expected + Duration::from_millis(5),
            "expected ~{expected:?}, got {actual:?}"
        );
    }

    fn request() -> EditRequest {
        EditRequest::new("add bicycles", b"img".to_vec(), ImageFormat::Png)
    }

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(10));
        assert_eq!(policy.delay_for(1), Duration::from_secs(20));
        assert_eq!(policy.delay_for(3), Duration::from_secs(80));
    }

    #[test]
    fn test_policy_needs_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_once_after_rate_limit() {
        let editor = ScriptedEditor::new(vec![
            Err(SceneGenError::RateLimited),
            Ok(EditedImage::from_bytes(b"Hello".to_vec())),
        ]);
        let policy = RetryPolicy::default();

        let image = editor.edit_with_retries(&request(), &policy).await.unwrap();
        assert_eq!(image.data, b"Hello");

        let calls = editor.calls();
        assert_eq!(calls.len(), 2);
        assert_close(calls[1] - calls[0], policy.initial_backoff);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_after_max_attempts() {
        let editor = ScriptedEditor::new((0..5).map(|_| Err(SceneGenError::RateLimited)).collect());
        let policy = RetryPolicy::default();
        let start = Instant::now();

        let err = editor.edit_with_retries(&request(), &policy).await.unwrap_err();
        assert!(matches!(err, SceneGenError::RetriesExhausted { attempts: 5 }));
        assert_eq!(editor.calls().len(), 5);

        // 10 + 20 + 40 + 80, no sleep after the last attempt
        assert_close(start.elapsed(), Duration::from_secs(150));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_aborts() {
        let editor = ScriptedEditor::new(vec![Err(SceneGenError::Http {
            status: 403,
            body: "denied".into(),
        })]);

        let err = editor
            .edit_with_retries(&request(), &RetryPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SceneGenError::Http { status: 403, .. }));
        assert_eq!(editor.calls().len(), 1);
    }
}
