//! Expression and equation engine.
//!
//! `tokenize -> parse -> evaluate | solve | sample`, with [`format_number`] for
//! anything shown to a user. Nothing here keeps state between calls; history
//! and mode toggles belong to the front ends.

pub mod ast;
pub mod eval;
pub mod format;
pub mod lexer;
pub mod parser;
pub mod sampler;
pub mod solver;

use thiserror::Error;
use tracing::{debug, trace};

pub use ast::{Constant, Expr, Function};
pub use eval::{evaluate, AngleMode, EvalContext, EvalError};
pub use format::format_number;
pub use lexer::{tokenize, LexError, Token, TokenKind};
pub use parser::{implicit_multiplication, parse, parse_equation, ParseError};
pub use sampler::{SamplePoint, Sampler, Viewport, PLOT_VARIABLE};
pub use solver::{solve, validate_variable, Solution, SolveError};

/// Any failure of a public entry point.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Solve(#[from] SolveError),
}

fn prepare(input: &str) -> Result<Vec<Token>, CalcError> {
    let tokens = implicit_multiplication(tokenize(input)?);
    trace!(count = tokens.len(), "tokenized input");
    Ok(tokens)
}

/// Evaluates an arithmetic expression and formats the result.
pub fn evaluate_expression(input: &str, angle_mode: AngleMode) -> Result<String, CalcError> {
    let tokens = prepare(input)?;
    let expr = parse(&tokens)?;
    let value = evaluate(&expr, &EvalContext::new(angle_mode))?;
    if !value.is_finite() {
        return Err(EvalError::NonFiniteResult.into());
    }
    let formatted = format_number(value);
    debug!(input, ?angle_mode, result = %formatted, "evaluated expression");
    Ok(formatted)
}

/// Solves a linear or quadratic equation in `variable`.
pub fn solve_equation(input: &str, variable: char) -> Result<Solution, CalcError> {
    let variable = validate_variable(&variable.to_string())?;
    let tokens = prepare(input)?;
    let separators = tokens.iter().filter(|t| t.kind == TokenKind::Equals).count();
    if separators != 1 {
        return Err(SolveError::MalformedEquation.into());
    }
    let (lhs, rhs) = parse_equation(&tokens)?;
    let solution = solve(&lhs, &rhs, variable, &EvalContext::default())?;
    debug!(input, %variable, ?solution, "solved equation");
    Ok(solution)
}

/// Parses `input` as a function of `x` ready to be sampled.
///
/// Only lexing and parsing can fail; points that do not evaluate are
/// skipped while sampling.
pub fn sample_function(
    input: &str,
    x_range: (f64, f64),
    y_range: (f64, f64),
    steps: u32,
) -> Result<Sampler, CalcError> {
    let tokens = prepare(input)?;
    let expr = parse(&tokens)?;
    debug!(input, ?x_range, ?y_range, steps, "prepared function for sampling");
    Ok(Sampler::new(expr, x_range, y_range, steps))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_expression() {
        assert_eq!(evaluate_expression("2 + 3 * 4", AngleMode::Radian).unwrap(), "14");
        assert_eq!(evaluate_expression("1 / 3", AngleMode::Radian).unwrap(), "0.33333333");
        assert_eq!(evaluate_expression("2pi", AngleMode::Radian).unwrap(), "6.28318531");
        assert_eq!(evaluate_expression("sin(90)", AngleMode::Degree).unwrap(), "1");
    }

    #[test]
    fn test_evaluate_expression_errors() {
        assert_eq!(
            evaluate_expression("1 / 0", AngleMode::Radian),
            Err(CalcError::Eval(EvalError::DivisionByZero))
        );
        assert_eq!(
            evaluate_expression("10 ^ 400", AngleMode::Radian),
            Err(CalcError::Eval(EvalError::NonFiniteResult))
        );
        assert!(matches!(
            evaluate_expression("2 # 2", AngleMode::Radian),
            Err(CalcError::Lex(_))
        ));
        assert!(matches!(
            evaluate_expression("(2 + 2", AngleMode::Radian),
            Err(CalcError::Parse(ParseError::UnbalancedParentheses))
        ));
    }

    #[test]
    fn test_percent() {
        assert_eq!(evaluate_expression("50%", AngleMode::Radian).unwrap(), "0.5");
        assert_eq!(evaluate_expression("200 * 10%", AngleMode::Radian).unwrap(), "20");
        assert_eq!(
            evaluate_expression("12.5%x", AngleMode::Radian),
            Err(CalcError::Eval(EvalError::UnboundVariable('x')))
        );
        assert_eq!(solve_equation("50%x = 3", 'x'), Ok(Solution::OneReal(6.0)));
    }

    #[test]
    fn test_deeply_nested_input_fails_cleanly() {
        let input = format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000));
        assert!(matches!(
            evaluate_expression(&input, AngleMode::Radian),
            Err(CalcError::Parse(ParseError::TooDeep { .. }))
        ));
        let chain = vec!["x"; 5_000].join(" * ");
        assert_eq!(
            solve_equation(&format!("{} = 1", chain), 'x'),
            Err(CalcError::Parse(ParseError::TooLong))
        );
    }

    #[test]
    fn test_solve_equation_rejects_bad_shapes() {
        assert_eq!(
            solve_equation("2x + 3", 'x'),
            Err(CalcError::Solve(SolveError::MalformedEquation))
        );
        assert_eq!(
            solve_equation("x = 1 = 2", 'x'),
            Err(CalcError::Solve(SolveError::MalformedEquation))
        );
        assert_eq!(
            solve_equation("x = 1", '1'),
            Err(CalcError::Solve(SolveError::InvalidVariableName("1".to_string())))
        );
    }

    #[test]
    fn test_solve_other_variable() {
        assert_eq!(solve_equation("3y - 6 = 0", 'y'), Ok(Solution::OneReal(2.0)));
    }

    #[test]
    fn test_sample_function_reports_parse_errors_only() {
        assert!(sample_function("1/x", (-1.0, 1.0), (-10.0, 10.0), 3).is_ok());
        assert!(matches!(
            sample_function("1/", (-1.0, 1.0), (-10.0, 10.0), 3),
            Err(CalcError::Parse(_))
        ));
    }

    #[test]
    fn test_engine_types_are_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Sampler>();
        assert_send_sync::<Solution>();
        assert_send_sync::<CalcError>();
    }
}
