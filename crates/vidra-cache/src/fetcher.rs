use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;
use vidra_net::{Fetch, FetchSource, FetchedChunk, NetError};

use crate::scope::in_scope;
use crate::store::SegmentStore;

/// Read-through cache decorator for a [`Fetch`] implementation.
///
/// Hits are served from the store and tagged [`FetchSource::Cache`] so
/// their timing is never mistaken for a network measurement. Misses go to
/// the inner fetcher; only successful responses are stored. URLs outside
/// the segment scope always pass straight through.
#[derive(Clone)]
pub struct CachedFetcher<F> {
    inner: F,
    store: Arc<SegmentStore>,
}

impl<F: Fetch> CachedFetcher<F> {
    pub fn new(inner: F, store: Arc<SegmentStore>) -> Self {
        Self { inner, store }
    }

    pub fn store(&self) -> &Arc<SegmentStore> {
        &self.store
    }
}

#[async_trait]
impl<F: Fetch> Fetch for CachedFetcher<F> {
    async fn fetch(&self, url: Url) -> Result<FetchedChunk, NetError> {
        if !in_scope(&url) {
            return self.inner.fetch(url).await;
        }

        if let Some(bytes) = self.store.get(&url) {
            debug!(%url, bytes = bytes.len(), "cache hit");
            return Ok(FetchedChunk {
                url,
                status: 200,
                bytes,
                elapsed: Duration::ZERO,
                source: FetchSource::Cache,
            });
        }

        debug!(%url, "cache miss");
        let chunk = self.inner.fetch(url).await?;
        if chunk.is_success() {
            self.store.insert(chunk.url.clone(), chunk.bytes.clone());
        }
        Ok(chunk)
    }
}
