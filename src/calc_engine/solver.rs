//! Linear and quadratic equations in one variable.
//!
//! Both sides are folded into a [`Polynomial`] by walking the parse tree, so
//! `2x + x = 3` and `(x + 1) * 2 = x` are handled without looking at the text.

use std::ops::{Add, Neg, Sub};

use thiserror::Error;
use tracing::trace;

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::eval::{apply_binary, evaluate, EvalContext, EvalError};
use super::format::format_number;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("an equation needs exactly one '='")]
    MalformedEquation,
    #[error("the equation is not linear or quadratic in the variable")]
    UnsupportedTerm,
    #[error("'{0}' is not a valid variable name")]
    InvalidVariableName(String),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Solution {
    NoSolution,
    InfiniteSolutions,
    OneReal(f64),
    TwoReal(f64, f64),
    DoubleRoot(f64),
    ComplexPair(f64, f64),
}

impl Solution {
    /// Human-readable answer, e.g. `x = 3 or x = 2`.
    pub fn describe(&self, variable: char) -> String {
        match *self {
            Solution::NoSolution => "No solution".to_string(),
            Solution::InfiniteSolutions => "Infinite solutions".to_string(),
            Solution::OneReal(x) => format!("{} = {}", variable, format_number(x)),
            Solution::TwoReal(x1, x2) => format!(
                "{v} = {} or {v} = {}",
                format_number(x1),
                format_number(x2),
                v = variable
            ),
            Solution::DoubleRoot(x) => format!("{} = {} (double root)", variable, format_number(x)),
            Solution::ComplexPair(re, im) => format!(
                "{} = {} ± {}i",
                variable,
                format_number(re),
                format_number(im.abs())
            ),
        }
    }
}

/// `quadratic·v² + linear·v + constant`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Polynomial {
    pub quadratic: f64,
    pub linear: f64,
    pub constant: f64,
}

impl Polynomial {
    pub fn constant(value: f64) -> Self {
        Polynomial {
            constant: value,
            ..Default::default()
        }
    }

    pub fn variable() -> Self {
        Polynomial {
            linear: 1.0,
            ..Default::default()
        }
    }

    pub fn degree(&self) -> u8 {
        if self.quadratic != 0.0 {
            2
        } else if self.linear != 0.0 {
            1
        } else {
            0
        }
    }

    fn scale(self, k: f64) -> Self {
        Polynomial {
            quadratic: self.quadratic * k,
            linear: self.linear * k,
            constant: self.constant * k,
        }
    }

    fn checked_div(self, divisor: f64) -> Result<Polynomial, SolveError> {
        Ok(Polynomial {
            quadratic: apply_binary(BinaryOp::Div, self.quadratic, divisor)?,
            linear: apply_binary(BinaryOp::Div, self.linear, divisor)?,
            constant: apply_binary(BinaryOp::Div, self.constant, divisor)?,
        })
    }

    fn checked_mul(self, other: Polynomial) -> Result<Polynomial, SolveError> {
        if self.degree() + other.degree() > 2 {
            return Err(SolveError::UnsupportedTerm);
        }
        Ok(Polynomial {
            quadratic: self.quadratic * other.constant
                + self.linear * other.linear
                + self.constant * other.quadratic,
            linear: self.linear * other.constant + self.constant * other.linear,
            constant: self.constant * other.constant,
        })
    }
}

impl Add for Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: Polynomial) -> Polynomial {
        Polynomial {
            quadratic: self.quadratic + rhs.quadratic,
            linear: self.linear + rhs.linear,
            constant: self.constant + rhs.constant,
        }
    }
}

impl Sub for Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: Polynomial) -> Polynomial {
        self + (-rhs)
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        self.scale(-1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EquationClass {
    Unclassified,
    Linear { a: f64, b: f64 },
    Quadratic { a: f64, b: f64, c: f64 },
    Solved(Solution),
}

impl EquationClass {
    /// Advances one step towards `Solved`.
    pub fn step(self, standard: &Polynomial) -> EquationClass {
        match self {
            EquationClass::Unclassified if standard.quadratic == 0.0 => EquationClass::Linear {
                a: standard.linear,
                b: standard.constant,
            },
            EquationClass::Unclassified => EquationClass::Quadratic {
                a: standard.quadratic,
                b: standard.linear,
                c: standard.constant,
            },
            EquationClass::Linear { a, b } => EquationClass::Solved(solve_linear(a, b)),
            EquationClass::Quadratic { a, b, c } => EquationClass::Solved(solve_quadratic(a, b, c)),
            solved @ EquationClass::Solved(_) => solved,
        }
    }
}

/// Accepts a single ASCII letter other than `e`, which always means Euler's number.
pub fn validate_variable(name: &str) -> Result<char, SolveError> {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() && c != 'e' => Ok(c),
        _ => Err(SolveError::InvalidVariableName(name.to_string())),
    }
}

/// Folds an expression into a polynomial in `variable`.
pub fn to_polynomial(expr: &Expr, variable: char, ctx: &EvalContext) -> Result<Polynomial, SolveError> {
    if !expr.mentions(variable) {
        if mentions_any_variable(expr) {
            return Err(SolveError::UnsupportedTerm);
        }
        return Ok(Polynomial::constant(evaluate(expr, ctx)?));
    }

    match expr {
        Expr::Number(n) => Ok(Polynomial::constant(*n)),
        Expr::Constant(c) => Ok(Polynomial::constant(c.value())),
        Expr::Variable(_) => Ok(Polynomial::variable()),
        Expr::Unary(UnaryOp::Neg, operand) => Ok(-to_polynomial(operand, variable, ctx)?),
        Expr::Binary(op, left, right) => {
            let l = to_polynomial(left, variable, ctx)?;
            match op {
                BinaryOp::Add => Ok(l + to_polynomial(right, variable, ctx)?),
                BinaryOp::Sub => Ok(l - to_polynomial(right, variable, ctx)?),
                BinaryOp::Mul => l.checked_mul(to_polynomial(right, variable, ctx)?),
                BinaryOp::Div => {
                    if right.mentions(variable) {
                        return Err(SolveError::UnsupportedTerm);
                    }
                    let divisor = to_polynomial(right, variable, ctx)?.constant;
                    l.checked_div(divisor)
                }
                BinaryOp::Pow => {
                    if right.mentions(variable) {
                        return Err(SolveError::UnsupportedTerm);
                    }
                    let exponent = to_polynomial(right, variable, ctx)?.constant;
                    integer_power(l, exponent)
                }
            }
        }
        // The variable sits inside a function argument.
        Expr::Call(..) => Err(SolveError::UnsupportedTerm),
    }
}

fn mentions_any_variable(expr: &Expr) -> bool {
    match expr {
        Expr::Number(_) | Expr::Constant(_) => false,
        Expr::Variable(_) => true,
        Expr::Unary(_, operand) => mentions_any_variable(operand),
        Expr::Binary(_, left, right) => mentions_any_variable(left) || mentions_any_variable(right),
        Expr::Call(_, argument) => mentions_any_variable(argument),
    }
}

fn integer_power(base: Polynomial, exponent: f64) -> Result<Polynomial, SolveError> {
    if exponent.fract() != 0.0 || !(0.0..=2.0).contains(&exponent) {
        return Err(SolveError::UnsupportedTerm);
    }
    let mut result = Polynomial::constant(1.0);
    for _ in 0..exponent as u32 {
        result = result.checked_mul(base)?;
    }
    Ok(result)
}

pub fn solve_linear(a: f64, b: f64) -> Solution {
    if a == 0.0 {
        if b == 0.0 {
            Solution::InfiniteSolutions
        } else {
            Solution::NoSolution
        }
    } else {
        Solution::OneReal(-b / a)
    }
}

pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Solution {
    if a == 0.0 {
        return solve_linear(b, c);
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant > 0.0 {
        let root = discriminant.sqrt();
        Solution::TwoReal((-b + root) / (2.0 * a), (-b - root) / (2.0 * a))
    } else if discriminant == 0.0 {
        Solution::DoubleRoot(-b / (2.0 * a))
    } else {
        Solution::ComplexPair(-b / (2.0 * a), discriminant.abs().sqrt() / (2.0 * a))
    }
}

/// Solves `lhs = rhs` for `variable`.
pub fn solve(lhs: &Expr, rhs: &Expr, variable: char, ctx: &EvalContext) -> Result<Solution, SolveError> {
    let standard = to_polynomial(lhs, variable, ctx)? - to_polynomial(rhs, variable, ctx)?;
    trace!(?standard, "normalised equation");

    let mut class = EquationClass::Unclassified;
    loop {
        class = class.step(&standard);
        if let EquationClass::Solved(solution) = class {
            return Ok(solution);
        }
    }
}
