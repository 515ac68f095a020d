//! Run metrics collection
//!
//! Counters describing one engine run. They are cheap to maintain and are
//! returned with the results for logging and reporting.

use std::time::Duration;

use serde::Serialize;

/// Metrics collected during one simulation run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunMetrics {
    /// Number of trials requested and completed
    pub trials: usize,
    /// Number of sample/evaluate batches processed
    pub batches: usize,
    /// Total values drawn across all variables
    pub samples_drawn: u64,
    /// Formula evaluations performed
    pub evaluations: u64,
    /// Wall-clock time spent in the run
    #[serde(serialize_with = "serialize_seconds")]
    pub elapsed: Duration,
}

impl RunMetrics {
    #[must_use]
    pub fn new(trials: usize) -> Self {
        Self {
            trials,
            ..Self::default()
        }
    }

    /// Record one batch of `size` trials over `variables` variables
    pub fn record_batch(&mut self, size: usize, variables: usize) {
        self.batches += 1;
        self.samples_drawn += (size * variables) as u64;
    }

    pub fn record_evaluations(&mut self, count: usize) {
        self.evaluations += count as u64;
    }

    /// Average trials per second, 0 when no time has elapsed
    #[must_use]
    pub fn trials_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.trials as f64 / secs
        }
    }
}

fn serialize_seconds<S: serde::Serializer>(elapsed: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(elapsed.as_secs_f64())
}
