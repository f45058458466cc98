use thiserror::Error;

use super::ast::{BinaryOp, Expr, Function, UnaryOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleMode {
    Degree,
    #[default]
    Radian,
}

impl AngleMode {
    pub fn toggled(self) -> Self {
        match self {
            AngleMode::Degree => AngleMode::Radian,
            AngleMode::Radian => AngleMode::Degree,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AngleMode::Degree => "DEG",
            AngleMode::Radian => "RAD",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("{function}({argument}) is outside the function's domain")]
    DomainError { function: Function, argument: f64 },
    #[error("result is a complex number")]
    ComplexResult,
    #[error("variable '{0}' has no value")]
    UnboundVariable(char),
    #[error("result is not a finite number")]
    NonFiniteResult,
}

/// Evaluation settings. Built per call and passed by reference.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EvalContext {
    pub angle_mode: AngleMode,
    pub binding: Option<(char, f64)>,
}

impl EvalContext {
    pub fn new(angle_mode: AngleMode) -> Self {
        EvalContext {
            angle_mode,
            binding: None,
        }
    }

    pub fn with_binding(mut self, variable: char, value: f64) -> Self {
        self.binding = Some((variable, value));
        self
    }

    fn lookup(&self, variable: char) -> Option<f64> {
        match self.binding {
            Some((name, value)) if name == variable => Some(value),
            _ => None,
        }
    }
}

pub fn evaluate(expr: &Expr, ctx: &EvalContext) -> Result<f64, EvalError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Constant(c) => Ok(c.value()),
        Expr::Variable(v) => ctx.lookup(*v).ok_or(EvalError::UnboundVariable(*v)),
        Expr::Unary(UnaryOp::Neg, operand) => Ok(-evaluate(operand, ctx)?),
        Expr::Binary(op, left, right) => {
            let l = evaluate(left, ctx)?;
            let r = evaluate(right, ctx)?;
            apply_binary(*op, l, r)
        }
        Expr::Call(function, argument) => {
            let arg = evaluate(argument, ctx)?;
            apply_function(*function, arg, ctx.angle_mode)
        }
    }
}

pub fn apply_binary(op: BinaryOp, l: f64, r: f64) -> Result<f64, EvalError> {
    match op {
        BinaryOp::Add => Ok(l + r),
        BinaryOp::Sub => Ok(l - r),
        BinaryOp::Mul => Ok(l * r),
        BinaryOp::Div => {
            if r == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(l / r)
        }
        BinaryOp::Pow => power(l, r),
    }
}

fn power(base: f64, exponent: f64) -> Result<f64, EvalError> {
    if base < 0.0 && exponent.fract() != 0.0 {
        return Err(EvalError::ComplexResult);
    }
    Ok(base.powf(exponent))
}

pub fn apply_function(function: Function, arg: f64, mode: AngleMode) -> Result<f64, EvalError> {
    let domain_error = || EvalError::DomainError {
        function,
        argument: arg,
    };

    let angle_in = if function.takes_angle() && mode == AngleMode::Degree {
        arg.to_radians()
    } else {
        arg
    };

    let value = match function {
        Function::Sin => angle_in.sin(),
        Function::Cos => angle_in.cos(),
        Function::Tan => angle_in.tan(),
        Function::Asin | Function::Acos if !(-1.0..=1.0).contains(&arg) => {
            return Err(domain_error());
        }
        Function::Asin => arg.asin(),
        Function::Acos => arg.acos(),
        Function::Atan => arg.atan(),
        Function::Log | Function::Ln if arg <= 0.0 => return Err(domain_error()),
        Function::Log => arg.log10(),
        Function::Ln => arg.ln(),
        Function::Sqrt if arg < 0.0 => return Err(domain_error()),
        Function::Sqrt => arg.sqrt(),
        Function::Abs => arg.abs(),
    };

    if function.returns_angle() && mode == AngleMode::Degree {
        Ok(value.to_degrees())
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc_engine::lexer::tokenize;
    use crate::calc_engine::parser::parse;

    fn eval_in(input: &str, ctx: &EvalContext) -> Result<f64, EvalError> {
        let expr = parse(&tokenize(input).unwrap()).unwrap();
        evaluate(&expr, ctx)
    }

    fn eval(input: &str) -> Result<f64, EvalError> {
        eval_in(input, &EvalContext::default())
    }

    fn eval_deg(input: &str) -> Result<f64, EvalError> {
        eval_in(input, &EvalContext::new(AngleMode::Degree))
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("1 + 2 * 3"), Ok(7.0));
        assert_eq!(eval("(1 + 2) * 3"), Ok(9.0));
        assert_eq!(eval("10 / 4"), Ok(2.5));
        assert_eq!(eval("2 ^ 3 ^ 2"), Ok(512.0));
        assert_eq!(eval("-2 ^ 2"), Ok(4.0));
        assert_eq!(eval("2 - -3"), Ok(5.0));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval("1 / 0"), Err(EvalError::DivisionByZero));
        assert_eq!(eval("1 / (2 - 2)"), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn test_negative_base_fractional_exponent() {
        assert_eq!(eval("(-8) ^ 0.5"), Err(EvalError::ComplexResult));
        assert_eq!(eval("(-2) ^ 3"), Ok(-8.0));
    }

    #[test]
    fn test_domain_errors() {
        assert_eq!(
            eval("sqrt(-1)"),
            Err(EvalError::DomainError {
                function: Function::Sqrt,
                argument: -1.0
            })
        );
        assert!(matches!(eval("ln(0)"), Err(EvalError::DomainError { .. })));
        assert!(matches!(eval("log(-5)"), Err(EvalError::DomainError { .. })));
        assert!(matches!(eval("asin(2)"), Err(EvalError::DomainError { .. })));
        assert!(matches!(eval("acos(-1.5)"), Err(EvalError::DomainError { .. })));
    }

    #[test]
    fn test_logs_and_roots() {
        assert_eq!(eval("log(1000)"), Ok(3.0));
        assert!((eval("ln(e)").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(eval("sqrt(16)"), Ok(4.0));
        assert_eq!(eval("abs(-3.5)"), Ok(3.5));
    }

    #[test]
    fn test_degree_mode() {
        assert!((eval_deg("sin(90)").unwrap() - 1.0).abs() < 1e-12);
        assert!((eval_deg("cos(180)").unwrap() + 1.0).abs() < 1e-12);
        assert!((eval_deg("asin(1)").unwrap() - 90.0).abs() < 1e-12);
        assert!((eval_deg("atan(1)").unwrap() - 45.0).abs() < 1e-12);
    }

    #[test]
    fn test_radian_mode() {
        assert_eq!(eval("sin(0)"), Ok(0.0));
        assert!((eval("cos(pi)").unwrap() + 1.0).abs() < 1e-12);
        assert!((eval("asin(1)").unwrap() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_variables() {
        let ctx = EvalContext::default().with_binding('x', 3.0);
        assert_eq!(eval_in("x ^ 2 + 1", &ctx), Ok(10.0));
        assert_eq!(eval_in("y + 1", &ctx), Err(EvalError::UnboundVariable('y')));
        assert_eq!(eval("x"), Err(EvalError::UnboundVariable('x')));
    }

    #[test]
    fn test_overflow_is_a_value() {
        assert_eq!(eval("10 ^ 400"), Ok(f64::INFINITY));
    }
}
