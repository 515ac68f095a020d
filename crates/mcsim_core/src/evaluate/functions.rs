//! The fixed set of math functions a formula may call.

use crate::error::ArithmeticError;

/// Names resolvable as functions inside a formula, and nothing else
pub const WHITELIST: [&str; 10] = [
    "sqrt", "exp", "log", "sin", "cos", "tan", "abs", "min", "max", "pow",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sqrt,
    Exp,
    /// Natural logarithm
    Log,
    Sin,
    Cos,
    Tan,
    Abs,
    Min,
    Max,
    Pow,
}

/// How many arguments a function accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exactly(k) => n == k,
            Arity::AtLeast(k) => n >= k,
        }
    }
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sqrt" => Function::Sqrt,
            "exp" => Function::Exp,
            "log" => Function::Log,
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "abs" => Function::Abs,
            "min" => Function::Min,
            "max" => Function::Max,
            "pow" => Function::Pow,
            _ => return None,
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            Function::Sqrt => "sqrt",
            Function::Exp => "exp",
            Function::Log => "log",
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Abs => "abs",
            Function::Min => "min",
            Function::Max => "max",
            Function::Pow => "pow",
        }
    }

    pub const fn arity(self) -> Arity {
        match self {
            Function::Min | Function::Max => Arity::AtLeast(2),
            Function::Pow => Arity::Exactly(2),
            _ => Arity::Exactly(1),
        }
    }

    /// Apply a one-argument function
    pub fn apply_unary(self, x: f64) -> Result<f64, ArithmeticError> {
        let name = self.name();
        let value = match self {
            Function::Sqrt if x < 0.0 => return Err(domain(name, x)),
            Function::Log if x <= 0.0 => return Err(domain(name, x)),
            Function::Sqrt => x.sqrt(),
            Function::Exp => x.exp(),
            Function::Log => x.ln(),
            Function::Sin => x.sin(),
            Function::Cos => x.cos(),
            Function::Tan => x.tan(),
            Function::Abs => x.abs(),
            Function::Min | Function::Max | Function::Pow => {
                unreachable!("{name} takes two or more arguments")
            }
        };
        checked(name, x, value)
    }

    /// Apply a two-argument function. `min`/`max` fold through this pairwise.
    pub fn apply_binary(self, a: f64, b: f64) -> Result<f64, ArithmeticError> {
        match self {
            Function::Min => Ok(a.min(b)),
            Function::Max => Ok(a.max(b)),
            Function::Pow => pow("pow", a, b),
            _ => unreachable!("{} takes one argument", self.name()),
        }
    }
}

/// Whether `name` is one of the whitelisted formula functions
pub fn is_whitelisted_function(name: &str) -> bool {
    Function::from_name(name).is_some()
}

/// Floating-point power shared by `pow(a, b)` and the `^` operator
pub(crate) fn pow(operation: &'static str, base: f64, exponent: f64) -> Result<f64, ArithmeticError> {
    if base == 0.0 && exponent < 0.0 {
        return Err(ArithmeticError::DivisionByZero);
    }
    checked(operation, base, base.powf(exponent))
}

/// Map a non-finite result computed from finite inputs to an error
#[inline]
pub(crate) fn checked(
    operation: &'static str,
    argument: f64,
    value: f64,
) -> Result<f64, ArithmeticError> {
    if value.is_nan() {
        Err(domain(operation, argument))
    } else if value.is_infinite() {
        Err(ArithmeticError::Overflow { operation })
    } else {
        Ok(value)
    }
}

fn domain(operation: &'static str, argument: f64) -> ArithmeticError {
    ArithmeticError::Domain {
        operation,
        argument,
    }
}
