use std::fmt::Write as _;

use crate::model::DistributionKind;

/// Errors raised while constructing a [`Variable`](crate::model::Variable).
///
/// These are always detected at construction time; sampling a validated
/// variable cannot fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("variable name must not be empty")]
    EmptyName,

    #[error("variable name '{0}' is not a valid identifier")]
    InvalidName(String),

    #[error("variable name '{0}' is reserved for a built-in function")]
    ReservedName(String),

    #[error(
        "variable '{variable}': unsupported distribution '{kind}' (use one of: {})",
        DistributionKind::NAMES.join(", ")
    )]
    UnknownKind { variable: String, kind: String },

    #[error("variable '{variable}': {kind} distribution requires parameter '{parameter}'")]
    MissingParameter {
        variable: String,
        kind: DistributionKind,
        parameter: &'static str,
    },

    #[error("variable '{variable}': {kind} distribution does not take parameter '{parameter}'")]
    UnexpectedParameter {
        variable: String,
        kind: DistributionKind,
        parameter: String,
    },

    #[error("variable '{variable}': invalid {kind} parameter {parameter} = {value}: {reason}")]
    InvalidParameter {
        variable: String,
        kind: DistributionKind,
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// A formula referenced a name that is neither a declared variable nor a
/// whitelisted function, or evaluation reached a variable with no value bound.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("variable '{name}' in formula '{formula}' is not defined")]
pub struct UndefinedVariableError {
    pub name: String,
    pub formula: String,
}

/// The formula could not be tokenized or parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error in formula '{formula}' at position {position}: {message}")]
pub struct SyntaxError {
    pub formula: String,
    /// Byte offset into the formula
    pub position: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormulaError {
    #[error(transparent)]
    UndefinedVariable(#[from] UndefinedVariableError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

/// Errors raised while assembling a [`Model`](crate::model::Model) or a
/// [`VariableSet`](crate::model::VariableSet).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error(transparent)]
    Formula(#[from] FormulaError),

    #[error("model for formula '{formula}' has no variables; add at least one variable")]
    NoVariables { formula: String },

    #[error("variable '{0}' is declared more than once")]
    DuplicateVariable(String),
}

impl ModelError {
    /// Name of the undefined identifier, if that is what went wrong
    pub fn undefined_variable(&self) -> Option<&str> {
        match self {
            ModelError::Formula(FormulaError::UndefinedVariable(e)) => Some(&e.name),
            _ => None,
        }
    }
}

impl From<UndefinedVariableError> for ModelError {
    fn from(err: UndefinedVariableError) -> Self {
        ModelError::Formula(err.into())
    }
}

impl From<SyntaxError> for ModelError {
    fn from(err: SyntaxError) -> Self {
        ModelError::Formula(err.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid trial count {requested}: must be a positive integer")]
pub struct InvalidTrialCountError {
    pub requested: i64,
}

/// The arithmetic failure underneath an [`EvaluationError`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("math domain error in {operation}({argument})")]
    Domain {
        operation: &'static str,
        argument: f64,
    },

    #[error("numeric overflow in {operation}")]
    Overflow { operation: &'static str },

    #[error("variable '{name}' has non-finite value {value}")]
    NonFiniteInput { name: String, value: f64 },
}

/// Formula evaluation failed for one concrete set of values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error(
    "failed to evaluate formula '{formula}' with {}: {cause}",
    display_values(.values)
)]
pub struct EvaluationError {
    pub formula: String,
    /// The bound values at the time of failure, in declaration order
    pub values: Vec<(String, f64)>,
    #[source]
    pub cause: ArithmeticError,
}

fn display_values(values: &[(String, f64)]) -> String {
    if values.is_empty() {
        return "no values".to_string();
    }
    let mut out = String::new();
    for (i, (name, value)) in values.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{name}={value}");
    }
    out
}

/// Errors from [`Engine::run`](crate::simulation::Engine::run).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    InvalidTrialCount(#[from] InvalidTrialCountError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// Errors from evaluating a formula against a (possibly partial) set of
/// named values, including the point estimator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluateError {
    #[error(transparent)]
    UndefinedVariable(#[from] UndefinedVariableError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// Umbrella error for callers that drive the whole pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    InvalidTrialCount(#[from] InvalidTrialCountError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error(transparent)]
    UndefinedVariable(#[from] UndefinedVariableError),
}

impl From<FormulaError> for Error {
    fn from(err: FormulaError) -> Self {
        Error::Model(err.into())
    }
}

impl From<RunError> for Error {
    fn from(err: RunError) -> Self {
        match err {
            RunError::InvalidTrialCount(e) => Error::InvalidTrialCount(e),
            RunError::Evaluation(e) => Error::Evaluation(e),
        }
    }
}

impl From<EvaluateError> for Error {
    fn from(err: EvaluateError) -> Self {
        match err {
            EvaluateError::UndefinedVariable(e) => Error::UndefinedVariable(e),
            EvaluateError::Evaluation(e) => Error::Evaluation(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
