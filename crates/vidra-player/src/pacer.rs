use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::{PlayerError, PlayerResult};
use crate::pipeline::MediaPipeline;

#[derive(Clone, Copy, Debug)]
pub struct PacerOptions {
    /// Buffer level the session tries to hold ahead of the position.
    pub target: Duration,
    /// Below this the next fetch starts immediately.
    pub min: Duration,
    /// Re-check interval while the buffer is above target.
    pub poll: Duration,
}

impl Default for PacerOptions {
    fn default() -> Self {
        Self {
            target: Duration::from_secs(5),
            min: Duration::from_secs(1),
            poll: Duration::from_millis(150),
        }
    }
}

/// Gates segment fetching on the pipeline's buffer level.
///
/// Stateless between calls; each wait re-reads the buffered range. The
/// wait is an awaited timer, so a stalled buffer costs one poll-interval
/// wakeup rather than a spin.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pacer {
    options: PacerOptions,
}

impl Pacer {
    pub fn new(options: PacerOptions) -> Self {
        Self { options }
    }

    fn buffered_ahead<P: MediaPipeline>(pipeline: &P) -> f64 {
        match pipeline.buffered_end_secs() {
            Some(end) => (end - pipeline.position_secs()).max(0.0),
            None => 0.0,
        }
    }

    /// Wait until the buffer has room for the next segment.
    pub async fn wait_for_capacity<P: MediaPipeline>(
        &self,
        pipeline: &P,
        cancel: &CancellationToken,
    ) -> PlayerResult<()> {
        loop {
            let ahead = Self::buffered_ahead(pipeline);

            if ahead < self.options.min.as_secs_f64() {
                return Ok(());
            }
            if ahead <= self.options.target.as_secs_f64() {
                return Ok(());
            }

            trace!(ahead_secs = ahead, "buffer above target, pacing");
            tokio::select! {
                _ = cancel.cancelled() => return Err(PlayerError::Cancelled),
                _ = tokio::time::sleep(self.options.poll) => {}
            }
        }
    }
}
