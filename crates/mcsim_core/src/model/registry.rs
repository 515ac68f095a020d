use std::sync::Arc;

use super::variable::Variable;
use crate::error::ModelError;

/// Caller-side registry of variables, kept in insertion order.
///
/// Variables are handed out as `Arc`s, so a [`Model`](super::Model) built
/// from the set shares them with the registry.
#[derive(Debug, Clone, Default)]
pub struct VariableSet {
    variables: Vec<Arc<Variable>>,
}

impl VariableSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a variable. Names must be unique within the set.
    pub fn insert(&mut self, variable: impl Into<Arc<Variable>>) -> Result<Arc<Variable>, ModelError> {
        let variable = variable.into();
        if self.contains(variable.name()) {
            return Err(ModelError::DuplicateVariable(variable.name().to_string()));
        }
        tracing::debug!(%variable, "variable added");
        self.variables.push(Arc::clone(&variable));
        Ok(variable)
    }

    /// Remove a variable by name, keeping the order of the rest
    pub fn remove(&mut self, name: &str) -> Option<Arc<Variable>> {
        let position = self.variables.iter().position(|v| v.name() == name)?;
        tracing::debug!(name, "variable removed");
        Some(self.variables.remove(position))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Variable>> {
        self.variables.iter().find(|v| v.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Variable>> {
        self.variables.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.name())
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn clear(&mut self) {
        self.variables.clear();
    }
}

impl<'a> IntoIterator for &'a VariableSet {
    type Item = &'a Arc<Variable>;
    type IntoIter = std::slice::Iter<'a, Arc<Variable>>;

    fn into_iter(self) -> Self::IntoIter {
        self.variables.iter()
    }
}
