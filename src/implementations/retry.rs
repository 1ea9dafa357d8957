use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{ self, StreamExt };
use log::{ debug, warn };

use crate::config::RetryPolicy;
use crate::errors::{ PatentError, PatentResult, RecoverableError };
use crate::traits::{ ModelClient, ModelRequest, TextStream };

/// Adds a per-call deadline and bounded retries to any model client.
///
/// Blocking calls are retried as a whole. For streams only the setup is
/// retried: once fragments flow, a failure ends the stream, and each wait for
/// the next fragment is bounded by the same deadline.
pub struct RetryingModelClient<C> {
    inner: C,
    policy: RetryPolicy,
    timeout: Duration,
}

impl<C: ModelClient> RetryingModelClient<C> {
    pub fn new(inner: C, policy: RetryPolicy, timeout: Duration) -> Self {
        Self { inner, policy, timeout }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Whether to try again after `err` on attempt `attempt` (1-based)
    fn should_retry(&self, err: &PatentError, attempt: u32) -> bool {
        err.is_recoverable() && attempt < self.policy.max_attempts
    }

    async fn pause(&self, err: &PatentError, attempt: u32) {
        let delay = self.policy.backoff(attempt);
        warn!(
            "Attempt {}/{} failed: {}. Retrying in {:?}",
            attempt,
            self.policy.max_attempts,
            err,
            delay
        );
        tokio::time::sleep(delay).await;
    }
}

/// Bound each wait for the next fragment by `timeout`
fn with_idle_timeout(inner: TextStream, timeout: Duration) -> TextStream {
    stream
        ::unfold(Some(inner), move |state| async move {
            let mut inner = state?;
            match tokio::time::timeout(timeout, inner.next()).await {
                Ok(Some(Ok(event))) => Some((Ok(event), Some(inner))),
                Ok(Some(Err(e))) => Some((Err(e), None)),
                Ok(None) => None,
                Err(_) => {
                    warn!("No stream fragment within {:?}", timeout);
                    Some((Err(PatentError::Timeout(timeout)), None))
                }
            }
        })
        .boxed()
}

#[async_trait]
impl<C: ModelClient> ModelClient for RetryingModelClient<C> {
    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    async fn complete(&self, request: &ModelRequest) -> PatentResult<String> {
        let mut attempt = 1;
        loop {
            debug!("{} call, attempt {}", request.role, attempt);
            let result = match tokio::time::timeout(self.timeout, self.inner.complete(request)).await {
                Ok(result) => result,
                Err(_) => Err(PatentError::Timeout(self.timeout)),
            };
            match result {
                Ok(text) => {
                    return Ok(text);
                }
                Err(e) if self.should_retry(&e, attempt) => {
                    self.pause(&e, attempt).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(e);
                }
            }
        }
    }

    async fn stream(&self, request: &ModelRequest) -> PatentResult<TextStream> {
        let mut attempt = 1;
        loop {
            debug!("{} stream setup, attempt {}", request.role, attempt);
            let result = match tokio::time::timeout(self.timeout, self.inner.stream(request)).await {
                Ok(result) => result,
                Err(_) => Err(PatentError::Timeout(self.timeout)),
            };
            match result {
                Ok(stream) => {
                    return Ok(with_idle_timeout(stream, self.timeout));
                }
                Err(e) if self.should_retry(&e, attempt) => {
                    self.pause(&e, attempt).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(e);
                }
            }
        }
    }
}
