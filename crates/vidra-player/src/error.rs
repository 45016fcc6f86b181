use thiserror::Error;
use vidra_manifest::ManifestError;
use vidra_net::NetError;

use crate::pipeline::SinkError;

pub type PlayerResult<T> = Result<T, PlayerError>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Track {
    Video,
    Audio,
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Track::Video => f.write_str("video"),
            Track::Audio => f.write_str("audio"),
        }
    }
}

/// Why a segment or init fetch did not produce usable bytes.
#[derive(Clone, Debug)]
pub enum FetchFailure {
    /// The server answered with a non-2xx status.
    Status(u16),
    /// The transport failed outright.
    Net(NetError),
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchFailure::Status(status) => write!(f, "HTTP {status}"),
            FetchFailure::Net(err) => write!(f, "{err}"),
        }
    }
}

impl From<NetError> for FetchFailure {
    fn from(err: NetError) -> Self {
        Self::Net(err)
    }
}

/// Terminal session errors. The session never retries on its own; every
/// variant here ends the playback.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("no supported {track} codec")]
    UnsupportedCodec { track: Track },

    #[error("{track} init fetch failed: {reason}")]
    InitFetchFailed { track: Track, reason: FetchFailure },

    #[error("init fetch for representation {label:?} failed: {reason}")]
    SwitchInitFailed { label: String, reason: FetchFailure },

    #[error("{track} segment {index} fetch failed: {reason}")]
    SegmentFetchFailed {
        track: Track,
        index: u32,
        reason: FetchFailure,
    },

    #[error("no segments to stream")]
    NoSegments,

    #[error("failed to create {track} sink")]
    SinkCreate {
        track: Track,
        #[source]
        source: SinkError,
    },

    #[error("failed to append to {track} sink")]
    SinkAppend {
        track: Track,
        #[source]
        source: SinkError,
    },

    #[error("session cancelled")]
    Cancelled,
}
