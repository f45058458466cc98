pub mod calc_engine;
pub mod history;
pub mod plot;
pub mod session;

pub use calc_engine::{
    evaluate_expression, format_number, sample_function, solve_equation, AngleMode, CalcError,
    SamplePoint, Sampler, Solution, Viewport,
};
