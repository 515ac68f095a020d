//! Model configuration
//!
//! `ModelConfig` is the serializable description of a model and how to run
//! it, as read from a model file:
//!
//! ```yaml
//! formula: units * (price - cost)
//! variables:
//!   - name: units
//!     kind: poisson
//!     parameters: { rate: 120 }
//!   - name: price
//!     kind: triangular
//!     parameters: { min: 8, mode: 10, max: 15 }
//!   - name: cost
//!     kind: normal
//!     parameters: { mean: 6, std: 0.5 }
//! simulation:
//!   trials: 20000
//!   seed: 7
//! ```
//!
//! Parameters stay string-keyed here; they are checked and turned into a
//! typed [`Distribution`](crate::model::Distribution) when the config is built.
//!
//! # Builder DSL
//!
//! For code, [`ModelBuilder`] is the fluent alternative:
//!
//! ```ignore
//! use mcsim_core::config::ModelBuilder;
//!
//! let model = ModelBuilder::new()
//!     .formula("x * 100")
//!     .uniform("x", 0.0, 10.0)
//!     .build()?;
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{InvalidTrialCountError, Result, ValidationError};
use crate::model::{Model, Results, Variable};
use crate::simulation::{self, DEFAULT_BATCH_SIZE, Engine};

pub mod builder;

pub use builder::ModelBuilder;

fn default_trials() -> i64 {
    10_000
}

/// One variable as written in a model file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableConfig {
    pub name: String,
    /// Lower-case distribution family, e.g. `normal`
    pub kind: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
}

impl VariableConfig {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            parameters: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn to_variable(&self) -> std::result::Result<Variable, ValidationError> {
        Variable::from_parameters(
            &self.name,
            &self.kind,
            self.parameters.iter().map(|(name, value)| (name, *value)),
        )
    }
}

impl From<&Variable> for VariableConfig {
    fn from(variable: &Variable) -> Self {
        let distribution = variable.distribution();
        Self {
            name: variable.name().to_string(),
            kind: distribution.kind().as_str().to_string(),
            parameters: distribution
                .parameters()
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }
}

/// How to run a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Kept signed so that a zero or negative count in a file is reported
    /// as an invalid trial count rather than a parse error
    #[serde(default = "default_trials")]
    pub trials: i64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub batch_size: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: default_trials(),
            seed: None,
            batch_size: None,
        }
    }
}

impl SimulationConfig {
    pub fn trial_count(&self) -> std::result::Result<usize, InvalidTrialCountError> {
        simulation::trial_count(self.trials)
    }

    #[must_use]
    pub fn engine(&self) -> Engine {
        Engine::new()
            .with_optional_seed(self.seed)
            .with_batch_size(self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE))
    }
}

/// Complete, serializable description of a model and its run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    pub formula: String,
    /// Declaration order matters; the first variable is the one the point
    /// estimator substitutes
    pub variables: Vec<VariableConfig>,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl ModelConfig {
    pub fn new(formula: impl Into<String>) -> Self {
        Self {
            formula: formula.into(),
            variables: Vec::new(),
            simulation: SimulationConfig::default(),
        }
    }

    /// Describe an existing model with default run settings
    pub fn from_model(model: &Model) -> Self {
        Self {
            formula: model.formula().source().to_string(),
            variables: model
                .variables()
                .iter()
                .map(|v| VariableConfig::from(&**v))
                .collect(),
            simulation: SimulationConfig::default(),
        }
    }

    /// Validate every variable and assemble the model
    pub fn build(&self) -> Result<Model> {
        let variables = self
            .variables
            .iter()
            .map(VariableConfig::to_variable)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Model::new(&self.formula, variables)?)
    }

    #[must_use]
    pub fn engine(&self) -> Engine {
        self.simulation.engine()
    }

    /// Build the model and run it with the configured settings
    pub fn run(&self) -> Result<Results> {
        let model = self.build()?;
        let trials = self.simulation.trial_count()?;
        Ok(self.engine().run(&model, trials)?)
    }
}
