use tokio::sync::broadcast;

use crate::session::SessionState;

/// Progress and diagnostics events emitted by a playback session.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    StateChanged(SessionState),
    RepresentationSwitched {
        from: Option<String>,
        to: String,
    },
    SegmentComplete {
        index: u32,
        total: u32,
        label: String,
    },
    /// Smoothed throughput after the latest sample, in kbps.
    Throughput {
        kbps: f64,
    },
    EndOfStream,
    Error(String),
}

/// Broadcast fan-out for [`SessionEvent`]s.
///
/// Lossy by design: slow subscribers drop the oldest events, and emitting
/// with no subscribers is a no-op.
#[derive(Clone, Debug)]
pub struct EventEmitter {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventEmitter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: SessionEvent) {
        // An error only means nobody is listening.
        let _ = self.tx.send(event);
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new(32)
    }
}
