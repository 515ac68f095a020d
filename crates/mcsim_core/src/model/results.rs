//! Simulation results and inverse queries
//!
//! `Results` owns the outcome sequence of one run. Summary statistics are
//! computed once when the results are built; rank queries use a sorted copy
//! of the outcomes.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::EvaluateError;
use crate::evaluate::Formula;
use crate::metrics::RunMetrics;
use crate::stats;

/// Descriptive statistics of an outcome sequence (population definitions)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub p2_5: f64,
    pub p25: f64,
    pub p75: f64,
    pub p97_5: f64,
}

impl Statistics {
    /// Compute statistics from outcomes and an ascending copy of them
    #[must_use]
    pub fn compute(outcomes: &[f64], sorted: &[f64]) -> Self {
        let mean = stats::mean(outcomes);
        Self {
            mean,
            median: stats::percentile_sorted(sorted, 50.0),
            std: stats::population_std(outcomes, mean),
            min: sorted.first().copied().unwrap_or(f64::NAN),
            max: sorted.last().copied().unwrap_or(f64::NAN),
            p2_5: stats::percentile_sorted(sorted, 2.5),
            p25: stats::percentile_sorted(sorted, 25.0),
            p75: stats::percentile_sorted(sorted, 75.0),
            p97_5: stats::percentile_sorted(sorted, 97.5),
        }
    }

    /// The 95% empirical interval `(p2_5, p97_5)`
    #[must_use]
    pub fn interval_95(&self) -> (f64, f64) {
        (self.p2_5, self.p97_5)
    }
}

/// How likely a goal is to be met, in coarse terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outlook {
    /// Probability of at least 50%
    Likely,
    /// Probability of at least 25%
    Possible,
    Unlikely,
}

impl fmt::Display for Outlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outlook::Likely => "likely",
            Outlook::Possible => "possible",
            Outlook::Unlikely => "unlikely",
        })
    }
}

/// Answer of the goal evaluator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalProbability {
    pub target: f64,
    /// Percent-rank of the target within the outcomes
    pub percentile: f64,
    /// Chance, in percent, of meeting or exceeding the target
    pub probability: f64,
}

impl GoalProbability {
    #[must_use]
    pub fn outlook(&self) -> Outlook {
        if self.probability >= 50.0 {
            Outlook::Likely
        } else if self.probability >= 25.0 {
            Outlook::Possible
        } else {
            Outlook::Unlikely
        }
    }
}

/// Answer of the point estimator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointEstimate {
    /// Value substituted for the first declared variable
    pub x: f64,
    /// Formula result for that value
    pub y: f64,
    /// Percent-rank of `y` within the outcomes
    pub percentile: f64,
}

/// Outcomes of one run plus everything derived from them
#[derive(Debug, Clone)]
pub struct Results {
    outcomes: Vec<f64>,
    sorted: Vec<f64>,
    statistics: Statistics,
    formula: Arc<Formula>,
    metrics: RunMetrics,
}

impl Results {
    /// `outcomes` must be non-empty; the engine guarantees at least one trial.
    pub(crate) fn new(formula: Arc<Formula>, outcomes: Vec<f64>, metrics: RunMetrics) -> Self {
        debug_assert!(!outcomes.is_empty());
        let sorted = stats::sorted(&outcomes);
        let statistics = Statistics::compute(&outcomes, &sorted);
        Self {
            outcomes,
            sorted,
            statistics,
            formula,
            metrics,
        }
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Raw outcomes; index `i` is trial `i`
    pub fn outcomes(&self) -> &[f64] {
        &self.outcomes
    }

    /// Outcomes in ascending order
    pub fn sorted_outcomes(&self) -> &[f64] {
        &self.sorted
    }

    pub fn into_outcomes(self) -> Vec<f64> {
        self.outcomes
    }

    /// Number of trials
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    /// Linear-interpolation percentile, `p` in `[0, 100]`
    pub fn percentile(&self, p: f64) -> f64 {
        stats::percentile_sorted(&self.sorted, p)
    }

    /// Percent-rank of `value`, ties counted as half. NaN for a NaN `value`.
    pub fn percent_rank(&self, value: f64) -> f64 {
        stats::percent_rank_sorted(&self.sorted, value)
    }

    /// Where `target` falls in the outcomes, and the chance of reaching it
    pub fn goal_probability(&self, target: f64) -> GoalProbability {
        let percentile = self.percent_rank(target);
        GoalProbability {
            target,
            percentile,
            probability: 100.0 - percentile,
        }
    }

    /// Evaluate the formula with `x` bound to the first declared variable
    /// only, and rank the result within the outcomes.
    ///
    /// Every other variable is left unbound, so a formula that reaches one
    /// fails with [`UndefinedVariableError`](crate::error::UndefinedVariableError).
    pub fn estimate(&self, x: f64) -> Result<PointEstimate, EvaluateError> {
        let y = self.formula.evaluate_with(|slot| (slot == 0).then_some(x))?;
        Ok(PointEstimate {
            x,
            y,
            percentile: self.percent_rank(y),
        })
    }
}
