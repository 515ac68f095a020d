use super::functions::{self, Function};
use crate::error::ArithmeticError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }

    fn apply(self, lhs: f64, rhs: f64) -> Result<f64, ArithmeticError> {
        let op = self.symbol();
        match self {
            BinaryOp::Add => functions::checked(op, lhs, lhs + rhs),
            BinaryOp::Sub => functions::checked(op, lhs, lhs - rhs),
            BinaryOp::Mul => functions::checked(op, lhs, lhs * rhs),
            BinaryOp::Div if rhs == 0.0 => Err(ArithmeticError::DivisionByZero),
            BinaryOp::Div => functions::checked(op, lhs, lhs / rhs),
            BinaryOp::Pow => functions::pow(op, lhs, rhs),
        }
    }
}

/// Compiled formula tree. Variables are referenced by declaration slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable(usize),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        function: Function,
        args: Vec<Expr>,
    },
}

/// Why a tree evaluation stopped
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EvalFailure {
    Arithmetic(ArithmeticError),
    /// No value is bound for this slot
    Unbound(usize),
    NonFiniteInput { slot: usize, value: f64 },
}

impl From<ArithmeticError> for EvalFailure {
    fn from(err: ArithmeticError) -> Self {
        EvalFailure::Arithmetic(err)
    }
}

impl Expr {
    /// Evaluate left to right, looking variable values up by slot.
    pub(crate) fn eval<F>(&self, lookup: &F) -> Result<f64, EvalFailure>
    where
        F: Fn(usize) -> Option<f64>,
    {
        match self {
            Expr::Number(value) => Ok(*value),
            Expr::Variable(slot) => {
                let value = lookup(*slot).ok_or(EvalFailure::Unbound(*slot))?;
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(EvalFailure::NonFiniteInput { slot: *slot, value })
                }
            }
            Expr::Neg(inner) => Ok(-inner.eval(lookup)?),
            Expr::Binary { op, lhs, rhs } => {
                let lhs = lhs.eval(lookup)?;
                let rhs = rhs.eval(lookup)?;
                Ok(op.apply(lhs, rhs)?)
            }
            Expr::Call { function, args } => match args.as_slice() {
                [x] => Ok(function.apply_unary(x.eval(lookup)?)?),
                [first, rest @ ..] => {
                    let mut acc = first.eval(lookup)?;
                    for arg in rest {
                        acc = function.apply_binary(acc, arg.eval(lookup)?)?;
                    }
                    Ok(acc)
                }
                [] => unreachable!("arity is checked when parsing"),
            },
        }
    }

    /// Slots referenced anywhere in the tree, in first-use order
    pub fn variables(&self) -> Vec<usize> {
        let mut slots = Vec::new();
        self.collect_variables(&mut slots);
        slots
    }

    fn collect_variables(&self, slots: &mut Vec<usize>) {
        match self {
            Expr::Number(_) => {}
            Expr::Variable(slot) => {
                if !slots.contains(slot) {
                    slots.push(*slot);
                }
            }
            Expr::Neg(inner) => inner.collect_variables(slots),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_variables(slots);
                rhs.collect_variables(slots);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_variables(slots);
                }
            }
        }
    }
}
