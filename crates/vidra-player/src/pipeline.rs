use async_trait::async_trait;
use bytes::Bytes;

/// Failure reported by the decode pipeline.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{0}")]
pub struct SinkError(pub String);

impl SinkError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// The decode/render side of a playback, implemented outside this crate.
///
/// Models a media-source style surface: codec capability queries, one
/// append sink per track, and a single buffered/position timeline for the
/// whole presentation.
pub trait MediaPipeline: Send + Sync {
    type Sink: BufferSink;

    /// Whether this pipeline can decode the given full mime string
    /// (including the `codecs=` parameter).
    fn is_type_supported(&self, mime: &str) -> bool;

    fn create_sink(&self, mime: &str) -> Result<Self::Sink, SinkError>;

    /// End of the buffered range in seconds, `None` when nothing is
    /// buffered yet.
    fn buffered_end_secs(&self) -> Option<f64>;

    /// Current playback position in seconds.
    fn position_secs(&self) -> f64;

    fn seek(&self, position_secs: f64);

    /// Signal that no further data will be appended.
    fn end_of_stream(&self);
}

/// Append target for one track's segments.
///
/// The session awaits every append before issuing the next one on the same
/// sink; implementations may assume at most one append is pending.
#[async_trait]
pub trait BufferSink: Send {
    async fn append(&mut self, bytes: Bytes) -> Result<(), SinkError>;
}
