use std::fmt;

use rand::Rng;

use super::distribution::{Distribution, Sampler};
use crate::error::ValidationError;
use crate::evaluate::is_whitelisted_function;

/// A named random input of a model.
///
/// Immutable once built. The sampler is prepared during construction, so a
/// `Variable` that exists can always be sampled.
#[derive(Debug, Clone)]
pub struct Variable {
    name: String,
    distribution: Distribution,
    sampler: Sampler,
}

impl Variable {
    pub fn new(name: impl Into<String>, distribution: Distribution) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_name(&name)?;
        let sampler = distribution.sampler(&name)?;
        Ok(Self {
            name,
            distribution,
            sampler,
        })
    }

    /// Build a variable from a kind name and string-keyed parameters,
    /// e.g. `("uniform", [("min", 0.0), ("max", 10.0)])`.
    pub fn from_parameters<I, K>(
        name: impl Into<String>,
        kind: &str,
        parameters: I,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let name = name.into();
        validate_name(&name)?;
        let distribution = Distribution::from_parameters(&name, kind, parameters)?;
        Self::new(name, distribution)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    /// Draw `n` independent values
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        let mut values = Vec::with_capacity(n);
        self.sampler.sample_into(rng, n, &mut values);
        values
    }

    /// Draw `n` independent values into a reusable buffer
    pub fn sample_into<R: Rng + ?Sized>(&self, n: usize, rng: &mut R, buf: &mut Vec<f64>) {
        self.sampler.sample_into(rng, n, buf);
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ {}", self.name, self.distribution)
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(ValidationError::EmptyName);
    };
    let identifier = (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !identifier {
        return Err(ValidationError::InvalidName(name.to_string()));
    }
    if is_whitelisted_function(name) {
        return Err(ValidationError::ReservedName(name.to_string()));
    }
    Ok(())
}
