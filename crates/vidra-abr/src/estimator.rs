#[cfg(test)]
use mockall::automock;

use crate::types::{SampleSource, ThroughputSample};

/// Trait for throughput estimation strategies.
///
/// Allows testing `AbrController` with mock estimators.
#[cfg_attr(test, automock)]
pub trait Estimator: Send {
    /// Estimated throughput in kilobits per second, once samples exist.
    fn estimate_kbps(&self) -> Option<f64>;

    /// Push a new throughput sample for estimation.
    fn push_sample(&mut self, sample: ThroughputSample);
}

/// Smoothed throughput estimate over per-segment transfer samples.
///
/// Two exponentially-weighted averages with different half-lives; the
/// estimate is the pessimistic minimum of the two, so a sudden drop shows
/// up quickly while a single fast segment does not inflate the estimate.
/// Cache-served samples are ignored: their timing measures the local store,
/// not the network.
#[derive(Clone, Debug)]
pub struct ThroughputEstimator {
    fast_ewma: Ewma,
    slow_ewma: Ewma,
}

impl Default for ThroughputEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl ThroughputEstimator {
    const FAST_HALF_LIFE_SECS: f64 = 2.0;
    const SLOW_HALF_LIFE_SECS: f64 = 10.0;
    const MIN_ELAPSED_MS: f64 = 0.5;

    pub fn new() -> Self {
        Self {
            fast_ewma: Ewma::new(Self::FAST_HALF_LIFE_SECS),
            slow_ewma: Ewma::new(Self::SLOW_HALF_LIFE_SECS),
        }
    }

    pub fn estimate_kbps(&self) -> Option<f64> {
        let est = self
            .fast_ewma
            .get_estimate()
            .min(self.slow_ewma.get_estimate());

        if est > 0.0 {
            Some(est)
        } else {
            None
        }
    }

    pub fn push_sample(&mut self, sample: ThroughputSample) {
        if !matches!(sample.source, SampleSource::Network) {
            return;
        }

        let elapsed_ms = (sample.elapsed.as_secs_f64() * 1000.0).max(Self::MIN_ELAPSED_MS);
        let kbps = (sample.bytes as f64) * 8.0 / elapsed_ms;
        let weight_secs = elapsed_ms / 1000.0;

        self.fast_ewma.add_sample(weight_secs, kbps);
        self.slow_ewma.add_sample(weight_secs, kbps);
    }
}

impl Estimator for ThroughputEstimator {
    fn estimate_kbps(&self) -> Option<f64> {
        self.estimate_kbps()
    }

    fn push_sample(&mut self, sample: ThroughputSample) {
        self.push_sample(sample);
    }
}

#[derive(Clone, Debug)]
struct Ewma {
    alpha: f64,
    last_estimate: f64,
    total_weight: f64,
}

impl Ewma {
    fn new(half_life_secs: f64) -> Self {
        Self {
            alpha: f64::exp(0.5_f64.ln() / half_life_secs.max(0.001)),
            last_estimate: 0.0,
            total_weight: 0.0,
        }
    }

    fn add_sample(&mut self, weight: f64, val: f64) {
        let adj_alpha = self.alpha.powf(weight.max(0.0));
        self.last_estimate = val * (1.0 - adj_alpha) + adj_alpha * self.last_estimate;
        self.total_weight += weight.max(0.0);
    }

    fn get_estimate(&self) -> f64 {
        if self.total_weight <= 0.0 {
            0.0
        } else {
            // Correct startup bias: early samples carry little total weight.
            let zero_factor = 1.0 - self.alpha.powf(self.total_weight);
            self.last_estimate / zero_factor.max(1e-6)
        }
    }
}
