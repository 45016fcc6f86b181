#![forbid(unsafe_code)]

//! Manifest model for segmented media.
//!
//! A manifest is a small JSON document published next to the media: the
//! available video representations (label, bitrate, segment directory,
//! segment count), a single audio track, and the shared init-segment name.
//! Loaded once per playback and immutable afterwards; segment URLs are
//! derived from it, never listed.

mod error;
mod loader;
mod model;

pub use error::{ManifestError, ManifestResult};
pub use loader::ManifestLoader;
pub use model::{AudioTrack, Manifest, ManifestDoc, RepresentationInfo};
