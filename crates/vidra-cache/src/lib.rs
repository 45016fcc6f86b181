#![forbid(unsafe_code)]

//! In-memory segment cache.
//!
//! One [`SegmentStore`] is shared per process (behind an `Arc`) and
//! outlives individual playback sessions, so replaying a video serves its
//! segments without touching the network. The store is bounded; least
//! recently used segments are evicted when the byte budget is exceeded.
//!
//! [`CachedFetcher`] is the read-through decorator the player actually
//! uses. Only segment URLs are cached; everything else passes through.

mod fetcher;
mod scope;
mod store;

pub use fetcher::CachedFetcher;
pub use scope::in_scope;
pub use store::{CacheOptions, SegmentStore};
