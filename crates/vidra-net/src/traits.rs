use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use url::Url;

use crate::{
    error::NetError,
    retry::{DefaultRetryPolicy, RetryNet},
    timeout::TimeoutNet,
    types::{Headers, RetryPolicy},
};

/// One completed HTTP response, success or not.
///
/// Non-2xx responses are carried here rather than raised as errors; the
/// segment layer decides whether a bad status is fatal.
#[derive(Clone, Debug)]
pub struct NetResponse {
    pub status: u16,
    pub bytes: Bytes,
}

impl NetResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg_attr(any(test, feature = "mock"), unimock::unimock(api = NetMock))]
#[async_trait]
pub trait Net: Send + Sync {
    /// Get all bytes from a URL. Non-2xx is an error.
    async fn get_bytes(&self, url: Url, headers: Option<Headers>) -> Result<Bytes, NetError>;

    /// Perform a GET and return the response whatever its status.
    /// Only transport-level failures are errors.
    async fn get(&self, url: Url, headers: Option<Headers>) -> Result<NetResponse, NetError>;
}

pub trait NetExt: Net + Sized {
    /// Add timeout layer.
    fn with_timeout(self, timeout: Duration) -> TimeoutNet<Self> {
        TimeoutNet::new(self, timeout)
    }

    /// Add retry layer.
    fn with_retry(self, policy: RetryPolicy) -> RetryNet<Self, DefaultRetryPolicy> {
        RetryNet::new(self, DefaultRetryPolicy::new(policy))
    }
}

impl<T: Net> NetExt for T {}
