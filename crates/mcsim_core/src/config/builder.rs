//! Model Builder
//!
//! The ModelBuilder provides a fluent API for declaring a formula and its
//! variables in code, with errors collected until `build`.
//!
//! # Example
//!
//! ```ignore
//! use mcsim_core::config::ModelBuilder;
//!
//! let model = ModelBuilder::new()
//!     .formula("units * (price - cost)")
//!     .poisson("units", 120.0)
//!     .triangular("price", 8.0, 10.0, 15.0)
//!     .normal("cost", 6.0, 0.5)
//!     .build()?;
//! ```

use super::{ModelConfig, SimulationConfig, VariableConfig};
use crate::error::{Error, Result};
use crate::model::{Distribution, Model, Variable};
use crate::simulation::Engine;

/// Builder for models, collecting typed variables in declaration order
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    formula: String,
    variables: Vec<Result<Variable>>,
    simulation: SimulationConfig,
}

impl ModelBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = formula.into();
        self
    }

    // =========================================================================
    // Variables
    // =========================================================================

    /// Declare a variable with an explicit distribution
    #[must_use]
    pub fn variable(mut self, name: impl Into<String>, distribution: Distribution) -> Self {
        self.variables
            .push(Variable::new(name, distribution).map_err(Error::from));
        self
    }

    #[must_use]
    pub fn normal(self, name: impl Into<String>, mean: f64, std: f64) -> Self {
        self.variable(name, Distribution::Normal { mean, std })
    }

    #[must_use]
    pub fn uniform(self, name: impl Into<String>, min: f64, max: f64) -> Self {
        self.variable(name, Distribution::Uniform { min, max })
    }

    #[must_use]
    pub fn triangular(self, name: impl Into<String>, min: f64, mode: f64, max: f64) -> Self {
        self.variable(name, Distribution::Triangular { min, mode, max })
    }

    #[must_use]
    pub fn lognormal(self, name: impl Into<String>, log_mean: f64, log_std: f64) -> Self {
        self.variable(name, Distribution::LogNormal { log_mean, log_std })
    }

    #[must_use]
    pub fn binomial(self, name: impl Into<String>, trials: u64, p: f64) -> Self {
        self.variable(name, Distribution::Binomial { trials, p })
    }

    #[must_use]
    pub fn poisson(self, name: impl Into<String>, rate: f64) -> Self {
        self.variable(name, Distribution::Poisson { rate })
    }

    /// A variable that always takes `value`
    #[must_use]
    pub fn constant(self, name: impl Into<String>, value: f64) -> Self {
        self.normal(name, value, 0.0)
    }

    // =========================================================================
    // Run settings
    // =========================================================================

    #[must_use]
    pub fn trials(mut self, trials: i64) -> Self {
        self.simulation.trials = trials;
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.simulation.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.simulation.batch_size = Some(batch_size);
        self
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Assemble the model. The first invalid variable, if any, is reported.
    pub fn build(self) -> Result<Model> {
        let variables = self.variables.into_iter().collect::<Result<Vec<_>>>()?;
        Ok(Model::new(&self.formula, variables)?)
    }

    /// Assemble the model together with an engine for the run settings
    pub fn build_with_engine(self) -> Result<(Model, Engine)> {
        let engine = self.simulation.engine();
        Ok((self.build()?, engine))
    }

    /// The equivalent serializable description
    pub fn build_config(self) -> Result<ModelConfig> {
        let variables = self
            .variables
            .into_iter()
            .map(|v| v.map(|v| VariableConfig::from(&v)))
            .collect::<Result<Vec<_>>>()?;
        Ok(ModelConfig {
            formula: self.formula,
            variables,
            simulation: self.simulation,
        })
    }
}
