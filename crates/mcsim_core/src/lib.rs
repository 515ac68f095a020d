//! Monte Carlo simulation library
//!
//! This crate estimates the distribution of an output quantity defined as a
//! formula over independent random input variables. It supports:
//! - Six distribution families (normal, uniform, triangular, lognormal, binomial, poisson)
//! - A sandboxed formula language with a fixed whitelist of math functions
//! - Seeded, batched simulation runs whose outcomes do not depend on the batch size
//! - Descriptive statistics and two inverse queries: goal probability and point estimate
//!
//! # Example
//!
//! ```ignore
//! use mcsim_core::{Distribution, Engine, Model, Variable};
//!
//! let x = Variable::new("x", Distribution::Uniform { min: 0.0, max: 10.0 })?;
//! let model = Model::new("x * 100", [x])?;
//!
//! let results = Engine::new().with_seed(42).run(&model, 10_000)?;
//! let stats = results.statistics();
//! let goal = results.goal_probability(800.0);
//! let estimate = results.estimate(5.0)?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod error;
pub mod evaluate;
pub mod metrics;
pub mod simulation;
pub mod simulation_state;
pub mod stats;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{ModelBuilder, ModelConfig};
pub use error::{Error, Result};
pub use evaluate::Formula;
pub use metrics::RunMetrics;
pub use model::{
    Distribution, DistributionKind, GoalProbability, Model, Outlook, PointEstimate, Results,
    Statistics, Variable, VariableSet,
};
pub use simulation::{DEFAULT_BATCH_SIZE, Engine, simulate, trial_count};
