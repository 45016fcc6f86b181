use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;
use url::Url;

use crate::{
    error::NetError,
    traits::{Net, NetResponse},
    types::{Headers, RetryPolicy},
};

#[cfg_attr(test, unimock::unimock(api = RetryClassifierMock))]
pub trait RetryClassifier {
    fn should_retry(&self, error: &NetError) -> bool;
}

#[derive(Default)]
pub struct DefaultRetryClassifier;

impl RetryClassifier for DefaultRetryClassifier {
    fn should_retry(&self, error: &NetError) -> bool {
        error.is_retryable()
    }
}

pub struct DefaultRetryPolicy {
    classifier: DefaultRetryClassifier,
    policy: RetryPolicy,
}

impl DefaultRetryPolicy {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            classifier: DefaultRetryClassifier,
            policy,
        }
    }
}

pub trait RetryPolicyTrait: Send + Sync {
    fn should_retry(&self, error: &NetError, attempt: u32) -> bool;
    fn delay_for_attempt(&self, attempt: u32) -> Duration;
    fn max_attempts(&self) -> u32;
}

impl RetryPolicyTrait for DefaultRetryPolicy {
    fn should_retry(&self, error: &NetError, attempt: u32) -> bool {
        if attempt >= self.policy.max_retries {
            return false;
        }

        self.classifier.should_retry(error)
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.policy.delay_for_attempt(attempt)
    }

    fn max_attempts(&self) -> u32 {
        self.policy.max_retries
    }
}

/// Retry decorator for Net implementations.
pub struct RetryNet<N, P> {
    inner: N,
    retry_policy: P,
}

impl<N: Net, P: RetryPolicyTrait> RetryNet<N, P> {
    pub fn new(inner: N, retry_policy: P) -> Self {
        Self {
            inner,
            retry_policy,
        }
    }

    async fn run<T, F, Fut>(&self, mut call: F) -> Result<T, NetError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, NetError>> + Send,
    {
        let mut last_error = None;

        for attempt in 0..=self.retry_policy.max_attempts() {
            match call().await {
                Ok(out) => return Ok(out),
                Err(error) => {
                    if !self.retry_policy.should_retry(&error, attempt) {
                        return Err(error);
                    }
                    debug!(attempt, error = %error, "vidra-net: retrying request");
                    last_error = Some(error);

                    if attempt < self.retry_policy.max_attempts() {
                        sleep(self.retry_policy.delay_for_attempt(attempt + 1)).await;
                    }
                }
            }
        }

        Err(NetError::RetryExhausted {
            max_retries: self.retry_policy.max_attempts(),
            source: Box::new(last_error.unwrap_or(NetError::Timeout)),
        })
    }
}

#[async_trait]
impl<N: Net, P: RetryPolicyTrait> Net for RetryNet<N, P> {
    async fn get_bytes(&self, url: Url, headers: Option<Headers>) -> Result<Bytes, NetError> {
        self.run(|| self.inner.get_bytes(url.clone(), headers.clone()))
            .await
    }

    async fn get(&self, url: Url, headers: Option<Headers>) -> Result<NetResponse, NetError> {
        self.run(|| self.inner.get(url.clone(), headers.clone()))
            .await
    }
}
