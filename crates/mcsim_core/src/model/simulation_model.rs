use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::registry::VariableSet;
use super::variable::Variable;
use crate::error::{EvaluateError, ModelError};
use crate::evaluate::{Bindings, Formula};

/// A formula together with the ordered variables it may reference.
///
/// Declaration order is observable: it fixes the formula's variable slots,
/// the engine's stream derivation order, and the variable the point
/// estimator substitutes (the first one).
#[derive(Debug, Clone)]
pub struct Model {
    formula: Arc<Formula>,
    variables: Vec<Arc<Variable>>,
    index: FxHashMap<String, usize>,
}

impl Model {
    /// Validate and assemble a model.
    ///
    /// Fails if there are no variables, if two variables share a name, or if
    /// the formula does not compile against the declared names.
    pub fn new<I>(formula: &str, variables: I) -> Result<Self, ModelError>
    where
        I: IntoIterator,
        I::Item: Into<Arc<Variable>>,
    {
        let variables: Vec<Arc<Variable>> = variables.into_iter().map(Into::into).collect();
        if variables.is_empty() {
            return Err(ModelError::NoVariables {
                formula: formula.to_string(),
            });
        }

        let mut index = FxHashMap::default();
        for (slot, variable) in variables.iter().enumerate() {
            if index.insert(variable.name().to_string(), slot).is_some() {
                return Err(ModelError::DuplicateVariable(variable.name().to_string()));
            }
        }

        let names: Vec<&str> = variables.iter().map(|v| v.name()).collect();
        let formula = Formula::compile(formula, &names)?;

        tracing::debug!(
            formula = formula.source(),
            variables = variables.len(),
            "model validated"
        );

        Ok(Self {
            formula: Arc::new(formula),
            variables,
            index,
        })
    }

    /// Build a model over every variable currently in `set`, in its order
    pub fn from_set(formula: &str, set: &VariableSet) -> Result<Self, ModelError> {
        Self::new(formula, set.iter().cloned())
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    pub(crate) fn shared_formula(&self) -> Arc<Formula> {
        Arc::clone(&self.formula)
    }

    /// Variables in declaration order
    pub fn variables(&self) -> &[Arc<Variable>] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&Arc<Variable>> {
        self.index.get(name).map(|&slot| &self.variables[slot])
    }

    /// The first declared variable, substituted by the point estimator
    pub fn first_variable(&self) -> &Variable {
        &self.variables[0]
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Always false; a model has at least one variable
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Evaluate the formula once with values looked up by name
    pub fn evaluate<B: Bindings + ?Sized>(&self, values: &B) -> Result<f64, EvaluateError> {
        self.formula.evaluate(values)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "y = {}", self.formula)?;
        for variable in &self.variables {
            writeln!(f, "  {variable}")?;
        }
        Ok(())
    }
}
