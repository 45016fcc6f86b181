#![forbid(unsafe_code)]

//! Adaptive bitrate selection for segmented playback.
//!
//! The selection rule is deliberately simple: take the estimated network
//! throughput, keep a fixed safety margin, and pick the most expensive
//! representation that still fits. A manual mode pins a representation and
//! ignores throughput entirely.
//!
//! The estimator smooths raw per-segment samples (dual EWMA) and the
//! controller enforces a minimum dwell time between automatic switches, so
//! noisy throughput does not oscillate the representation on every segment.

mod controller;
mod estimator;
mod selector;
mod types;

pub use controller::{AbrController, Decision};
pub use estimator::{Estimator, ThroughputEstimator};
pub use selector::{select, SAFETY_MARGIN};
pub use types::{AbrMode, AbrOptions, Rendition, SelectionState, ThroughputSample, SampleSource};
