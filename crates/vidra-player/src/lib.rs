#![forbid(unsafe_code)]

//! Playback session orchestration.
//!
//! A [`PlaybackSession`] drives one playback of one video: it negotiates
//! codecs against the decode pipeline, fetches init and media segments for
//! the video and audio tracks, adapts the video representation to measured
//! throughput, and paces fetching against the pipeline's buffer level.
//!
//! The decode pipeline itself is external; this crate only defines the
//! [`MediaPipeline`] and [`BufferSink`] traits it consumes.

mod error;
mod events;
mod options;
mod pacer;
mod pipeline;
mod session;

pub use error::{FetchFailure, PlayerError, PlayerResult, Track};
pub use events::{EventEmitter, SessionEvent};
pub use options::SessionOptions;
pub use pacer::{Pacer, PacerOptions};
pub use pipeline::{BufferSink, MediaPipeline, SinkError};
pub use session::{PlaybackSession, SessionHandle, SessionState};
