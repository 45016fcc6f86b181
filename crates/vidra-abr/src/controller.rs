use std::time::Instant;

use tracing::debug;

use crate::estimator::{Estimator, ThroughputEstimator};
use crate::selector::select;
use crate::types::{AbrMode, AbrOptions, Rendition, SelectionState, ThroughputSample};

/// Outcome of one selection round.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Decision {
    pub label: String,
    /// True when the label differs from the previous round.
    pub changed: bool,
}

/// Stateful selection driver.
///
/// Wraps the pure selection rule with throughput smoothing and a minimum
/// dwell time between automatic switches. Manual pins take effect on the
/// next round regardless of dwell.
pub struct AbrController<E = ThroughputEstimator> {
    options: AbrOptions,
    estimator: E,
    current: Option<String>,
    last_switch: Option<Instant>,
}

impl AbrController<ThroughputEstimator> {
    pub fn new(options: AbrOptions) -> Self {
        Self::with_estimator(options, ThroughputEstimator::new())
    }
}

impl<E: Estimator> AbrController<E> {
    pub fn with_estimator(options: AbrOptions, estimator: E) -> Self {
        Self {
            options,
            estimator,
            current: None,
            last_switch: None,
        }
    }

    pub fn mode(&self) -> &AbrMode {
        &self.options.mode
    }

    /// Replace the mode. The new mode applies on the next `decide` round.
    pub fn set_mode(&mut self, mode: AbrMode) {
        if self.options.mode != mode {
            debug!(?mode, "abr mode changed");
            self.options.mode = mode;
        }
    }

    pub fn push_sample(&mut self, sample: ThroughputSample) {
        self.estimator.push_sample(sample);
    }

    /// Smoothed throughput, falling back to the configured seed before the
    /// first network sample arrives.
    pub fn throughput_kbps(&self) -> f64 {
        self.estimator
            .estimate_kbps()
            .unwrap_or(self.options.initial_throughput_kbps)
    }

    pub fn selection(&self) -> Option<SelectionState> {
        self.current.as_ref().map(|label| SelectionState {
            mode: self.options.mode.clone(),
            current: label.clone(),
        })
    }

    /// Run one selection round.
    ///
    /// Returns `None` only when `renditions` is empty. The first round and
    /// every manual round always apply the computed label; automatic
    /// switches away from an established label are suppressed until
    /// `min_switch_interval` has passed since the last switch.
    pub fn decide(&mut self, renditions: &[Rendition], now: Instant) -> Option<Decision> {
        let throughput = self.throughput_kbps();
        let candidate = select(renditions, throughput, &self.options.mode)?;

        let label = match (&self.current, &self.options.mode) {
            (Some(current), AbrMode::Auto) if candidate != *current => {
                let dwell_ok = self
                    .last_switch
                    .is_none_or(|at| now.duration_since(at) >= self.options.min_switch_interval);
                if dwell_ok {
                    candidate
                } else {
                    current.clone()
                }
            }
            _ => candidate,
        };

        let changed = self.current.as_deref() != Some(label.as_str());
        if changed {
            debug!(
                from = self.current.as_deref().unwrap_or("-"),
                to = %label,
                throughput_kbps = throughput,
                "representation switch"
            );
            self.current = Some(label.clone());
            self.last_switch = Some(now);
        }

        Some(Decision { label, changed })
    }
}
