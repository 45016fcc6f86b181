use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::{debug, trace};
use url::Url;

/// Configuration for [`SegmentStore`].
#[derive(Clone, Copy, Debug)]
pub struct CacheOptions {
    /// Byte budget across all cached segments.
    pub max_bytes: u64,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            max_bytes: 256 * 1024 * 1024,
        }
    }
}

#[derive(Debug)]
struct Entry {
    bytes: Bytes,
    last_access: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<Url, Entry>,
    total_bytes: u64,
    tick: u64,
}

/// Bounded in-memory segment store, keyed by exact URL.
///
/// Content per key is immutable; a concurrent double-populate of the same
/// key is benign (last write wins, both writes carry identical bytes).
/// Shared behind an `Arc` and installed once per process.
#[derive(Debug, Default)]
pub struct SegmentStore {
    inner: RwLock<Inner>,
    options: CacheOptions,
}

impl SegmentStore {
    pub fn new(options: CacheOptions) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            options,
        }
    }

    /// Fetch cached bytes, bumping the entry's recency.
    pub fn get(&self, url: &Url) -> Option<Bytes> {
        let mut inner = self.inner.write();
        inner.tick += 1;
        let tick = inner.tick;
        let entry = inner.entries.get_mut(url)?;
        entry.last_access = tick;
        Some(entry.bytes.clone())
    }

    /// Insert a segment, evicting least recently used entries if the byte
    /// budget is exceeded. Oversized payloads are not cached at all.
    pub fn insert(&self, url: Url, bytes: Bytes) {
        let size = bytes.len() as u64;
        if size > self.options.max_bytes {
            debug!(%url, size, "segment larger than cache budget, not cached");
            return;
        }

        let mut inner = self.inner.write();
        inner.tick += 1;
        let tick = inner.tick;

        if let Some(old) = inner.entries.insert(url.clone(), Entry { bytes, last_access: tick }) {
            inner.total_bytes -= old.bytes.len() as u64;
        }
        inner.total_bytes += size;
        trace!(%url, size, total = inner.total_bytes, "segment cached");

        while inner.total_bytes > self.options.max_bytes {
            let victim = inner
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_access)
                .map(|(url, _)| url.clone());
            let Some(victim) = victim else { break };
            if let Some(entry) = inner.entries.remove(&victim) {
                inner.total_bytes -= entry.bytes.len() as u64;
                debug!(url = %victim, "segment evicted");
            }
        }
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.inner.read().entries.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.inner.read().total_bytes
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.entries.clear();
        inner.total_bytes = 0;
    }
}
