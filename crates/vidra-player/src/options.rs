use tokio_util::sync::CancellationToken;
use vidra_abr::AbrOptions;

use crate::pacer::PacerOptions;

/// Baseline H.264 codec strings tried when the manifest does not name a
/// video mime the pipeline accepts.
pub(crate) const VIDEO_MIME_FALLBACKS: &[&str] = &[
    "video/mp4; codecs=\"avc1.42E01E\"",
    "video/mp4; codecs=\"avc1.42C01E\"",
    "video/mp4; codecs=\"avc1.4D401F\"",
];

/// AAC-LC fallback for the audio track.
pub(crate) const AUDIO_MIME_FALLBACKS: &[&str] = &["audio/mp4; codecs=\"mp4a.40.2\""];

/// Configuration for one playback session.
#[derive(Clone, Debug)]
pub struct SessionOptions {
    pub abr: AbrOptions,
    pub pacer: PacerOptions,
    /// Capacity of the session event channel.
    pub event_capacity: usize,
    /// Cancels the session cooperatively; in-flight fetches are abandoned.
    pub cancel: CancellationToken,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionOptions {
    pub fn new() -> Self {
        Self {
            abr: AbrOptions::default(),
            pacer: PacerOptions::default(),
            event_capacity: 32,
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_abr(mut self, abr: AbrOptions) -> Self {
        self.abr = abr;
        self
    }

    #[must_use]
    pub fn with_pacer(mut self, pacer: PacerOptions) -> Self {
        self.pacer = pacer;
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}
