use std::time::Duration;

/// ABR mode selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbrMode {
    /// Automatic bitrate adaptation.
    Auto,
    /// Fixed representation; throughput is ignored while active.
    Manual(String),
}

impl Default for AbrMode {
    fn default() -> Self {
        Self::Auto
    }
}

/// One bitrate variant of the video track.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rendition {
    pub label: String,
    pub bitrate_kbps: u64,
}

impl Rendition {
    pub fn new(label: impl Into<String>, bitrate_kbps: u64) -> Self {
        Self {
            label: label.into(),
            bitrate_kbps,
        }
    }
}

/// Current selection, as mutated by user input and automatic re-evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionState {
    pub mode: AbrMode,
    pub current: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SampleSource {
    Network,
    Cache,
}

/// Throughput observation from one completed transfer.
#[derive(Clone, Copy, Debug)]
pub struct ThroughputSample {
    pub bytes: u64,
    pub elapsed: Duration,
    pub source: SampleSource,
}

#[derive(Clone, Debug)]
pub struct AbrOptions {
    /// Initial mode (and pinned label, for Manual).
    pub mode: AbrMode,
    /// Seed estimate used until the first network sample arrives.
    pub initial_throughput_kbps: f64,
    /// Minimum interval between automatic representation switches.
    /// `Duration::ZERO` disables the dwell gate.
    pub min_switch_interval: Duration,
}

impl Default for AbrOptions {
    fn default() -> Self {
        Self {
            mode: AbrMode::Auto,
            initial_throughput_kbps: 1500.0,
            min_switch_interval: Duration::from_secs(4),
        }
    }
}
