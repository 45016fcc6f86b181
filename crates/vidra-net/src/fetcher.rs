use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::time::Instant;
use tracing::debug;
use url::Url;

use crate::{
    error::NetError,
    traits::Net,
    types::Headers,
};

/// Lower bound on measured transfer time, so a clock-resolution zero does
/// not produce an absurd throughput sample.
const MIN_ELAPSED: Duration = Duration::from_micros(500);

/// Where a chunk's bytes came from. Cache-served chunks carry timing that
/// measures the store rather than the network, and are excluded from
/// throughput estimation downstream.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FetchSource {
    Network,
    Cache,
}

/// One fetched segment or initialization blob, with transfer timing.
#[derive(Clone, Debug)]
pub struct FetchedChunk {
    pub url: Url,
    pub status: u16,
    pub bytes: Bytes,
    pub elapsed: Duration,
    pub source: FetchSource,
}

impl FetchedChunk {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Instantaneous throughput of this transfer in kilobits per second.
    pub fn kbps(&self) -> f64 {
        let elapsed = self.elapsed.max(MIN_ELAPSED);
        (self.bytes.len() as f64 * 8.0) / elapsed.as_secs_f64() / 1000.0
    }
}

/// Fetches one segment at a time and reports transfer timing.
///
/// This layer never retries and never caches; decorate the underlying
/// [`Net`] with retry/timeout layers, and wrap the fetcher in a cache, as
/// needed.
#[cfg_attr(any(test, feature = "mock"), unimock::unimock(api = FetchMock))]
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: Url) -> Result<FetchedChunk, NetError>;
}

#[derive(Clone, Debug)]
pub struct SegmentFetcher<N> {
    net: N,
    headers: Option<Headers>,
}

impl<N: Net> SegmentFetcher<N> {
    pub fn new(net: N) -> Self {
        Self { net, headers: None }
    }

    /// Set additional HTTP headers for all requests.
    #[must_use]
    pub fn with_headers(mut self, headers: Option<Headers>) -> Self {
        self.headers = headers;
        self
    }
}

#[async_trait]
impl<N: Net> Fetch for SegmentFetcher<N> {
    async fn fetch(&self, url: Url) -> Result<FetchedChunk, NetError> {
        let start = Instant::now();
        let resp = self.net.get(url.clone(), self.headers.clone()).await?;
        let elapsed = start.elapsed();

        let chunk = FetchedChunk {
            url,
            status: resp.status,
            bytes: resp.bytes,
            elapsed,
            source: FetchSource::Network,
        };

        debug!(
            url = %chunk.url,
            status = chunk.status,
            bytes = chunk.bytes.len(),
            elapsed_ms = chunk.elapsed.as_millis() as u64,
            kbps = chunk.kbps() as u64,
            "vidra-net: segment fetched"
        );

        Ok(chunk)
    }
}
