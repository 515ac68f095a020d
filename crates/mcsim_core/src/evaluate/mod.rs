//! Formula language: tokenizing, parsing and sandboxed evaluation.
//!
//! A formula is compiled once against the ordered list of declared variable
//! names. Compilation strips the whitelisted function names, rejects any
//! other undeclared identifier, and builds an expression tree whose variable
//! references are declaration slots. Evaluation walks that tree with the
//! supplied values only; nothing else is reachable from a formula.

mod expr;
mod functions;
mod lexer;
mod parser;

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hash};

use rustc_hash::FxHashMap;

use crate::error::{
    ArithmeticError, EvaluateError, EvaluationError, FormulaError, SyntaxError,
    UndefinedVariableError,
};

pub use expr::{BinaryOp, Expr};
use expr::EvalFailure;
pub use functions::{Arity, Function, WHITELIST, is_whitelisted_function};

/// Name-to-value lookup used by [`Formula::evaluate`].
pub trait Bindings {
    fn value(&self, name: &str) -> Option<f64>;
}

impl<K, S> Bindings for HashMap<K, f64, S>
where
    K: Borrow<str> + Hash + Eq,
    S: BuildHasher,
{
    fn value(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl<K> Bindings for BTreeMap<K, f64>
where
    K: Borrow<str> + Ord,
{
    fn value(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl<K: AsRef<str>> Bindings for [(K, f64)] {
    fn value(&self, name: &str) -> Option<f64> {
        self.iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| *v)
    }
}

impl<K: AsRef<str>, const N: usize> Bindings for [(K, f64); N] {
    fn value(&self, name: &str) -> Option<f64> {
        self.as_slice().value(name)
    }
}

/// A compiled formula.
#[derive(Debug, Clone)]
pub struct Formula {
    source: String,
    names: Vec<String>,
    expr: Expr,
}

impl Formula {
    /// Compile `source` against the declared variable names.
    ///
    /// Slot `i` of the compiled formula is `declared[i]`.
    pub fn compile<S: AsRef<str>>(source: &str, declared: &[S]) -> Result<Self, FormulaError> {
        let names: Vec<String> = declared.iter().map(|s| s.as_ref().to_string()).collect();
        let mut slots: FxHashMap<&str, usize> = FxHashMap::default();
        for (slot, name) in names.iter().enumerate() {
            slots.entry(name.as_str()).or_insert(slot);
        }

        let lexed = lexer::tokenize(source);

        if let Some((name, _)) = lexed
            .identifiers()
            .filter(|(name, _)| !is_whitelisted_function(name))
            .find(|(name, _)| !slots.contains_key(name))
        {
            return Err(UndefinedVariableError {
                name: name.to_string(),
                formula: source.to_string(),
            }
            .into());
        }

        if let Some(span) = lexed.first_error {
            let found = source[span.clone()].chars().next().unwrap_or(' ');
            return Err(SyntaxError {
                formula: source.to_string(),
                position: span.start,
                message: format!("unexpected character '{found}'"),
            }
            .into());
        }

        let expr = parser::Parser::new(source, &lexed.tokens, |name| slots.get(name).copied())
            .parse()?;

        Ok(Self {
            source: source.to_string(),
            names,
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Declared variable names, by slot
    pub fn variable_names(&self) -> &[String] {
        &self.names
    }

    /// Declared names the formula actually uses, in first-use order
    pub fn referenced_variables(&self) -> Vec<&str> {
        self.expr
            .variables()
            .into_iter()
            .map(|slot| self.names[slot].as_str())
            .collect()
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluate with one value per declared slot. This is the engine's path;
    /// every slot is bound, so the only possible failure is arithmetic.
    pub fn evaluate_slots(&self, values: &[f64]) -> Result<f64, EvaluationError> {
        debug_assert_eq!(values.len(), self.names.len());
        self.expr.eval(&|slot| Some(values[slot])).map_err(|failure| {
            let cause = match self.arithmetic_cause(failure) {
                Ok(cause) => cause,
                Err(_) => unreachable!("every slot is bound"),
            };
            let bound = self.names.iter().cloned().zip(values.iter().copied());
            self.evaluation_error(cause, bound.collect())
        })
    }

    /// Evaluate with values looked up by name.
    ///
    /// A declared variable without a bound value fails with
    /// [`UndefinedVariableError`] when evaluation reaches it.
    pub fn evaluate<B: Bindings + ?Sized>(&self, values: &B) -> Result<f64, EvaluateError> {
        self.evaluate_with(|slot| values.value(&self.names[slot]))
    }

    /// Evaluate with an arbitrary slot lookup
    pub(crate) fn evaluate_with<F>(&self, lookup: F) -> Result<f64, EvaluateError>
    where
        F: Fn(usize) -> Option<f64>,
    {
        match self.expr.eval(&lookup) {
            Ok(value) => Ok(value),
            Err(failure) => {
                let cause = self.arithmetic_cause(failure)?;
                let bound = self
                    .names
                    .iter()
                    .enumerate()
                    .filter_map(|(slot, name)| lookup(slot).map(|v| (name.clone(), v)));
                Err(self.evaluation_error(cause, bound.collect()).into())
            }
        }
    }

    fn arithmetic_cause(&self, failure: EvalFailure) -> Result<ArithmeticError, UndefinedVariableError> {
        match failure {
            EvalFailure::Arithmetic(cause) => Ok(cause),
            EvalFailure::NonFiniteInput { slot, value } => Ok(ArithmeticError::NonFiniteInput {
                name: self.names[slot].clone(),
                value,
            }),
            EvalFailure::Unbound(slot) => Err(UndefinedVariableError {
                name: self.names[slot].clone(),
                formula: self.source.clone(),
            }),
        }
    }

    fn evaluation_error(&self, cause: ArithmeticError, values: Vec<(String, f64)>) -> EvaluationError {
        EvaluationError {
            formula: self.source.clone(),
            values,
            cause,
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
