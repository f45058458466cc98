#[cfg(feature = "line")]
mod line_mode;
#[cfg(feature = "tui")]
mod render_help;
#[cfg(feature = "tui")]
mod tui_mode;

use anyhow::{bail, Result};
use calcipro::calc_engine::{
    evaluate_expression, format_number, sample_function, solve_equation, AngleMode, Viewport,
};
use calcipro::plot::render_ascii;
use calcipro::session::EMPTY_PLOT_MESSAGE;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Scientific calculator, equation solver and function grapher", long_about = None)]
struct Cli {
    /// Start in degree mode instead of radians
    #[arg(long, global = true)]
    degrees: bool,

    /// Log filter, e.g. `debug` or `calcipro=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full-screen terminal interface
    #[cfg(feature = "tui")]
    Tui,
    /// Line-by-line interactive mode
    #[cfg(feature = "line")]
    Line,
    /// Evaluate an expression
    Eval {
        /// The expression to evaluate, e.g. "2sin(pi/4)"
        #[arg(allow_hyphen_values = true)]
        expression: String,
    },
    /// Solve a linear or quadratic equation
    Solve {
        /// The equation, e.g. "x^2 - 5x + 6 = 0"
        #[arg(allow_hyphen_values = true)]
        equation: String,
        /// Variable to solve for
        #[arg(long = "var", default_value_t = 'x')]
        variable: char,
    },
    /// Plot y = f(x) as a character grid
    Plot {
        /// The function of x, e.g. "sin(x)"
        #[arg(allow_hyphen_values = true)]
        function: String,
        #[arg(long, default_value_t = -10.0, allow_hyphen_values = true)]
        x_min: f64,
        #[arg(long, default_value_t = 10.0, allow_hyphen_values = true)]
        x_max: f64,
        #[arg(long, default_value_t = -10.0, allow_hyphen_values = true)]
        y_min: f64,
        #[arg(long, default_value_t = 10.0, allow_hyphen_values = true)]
        y_max: f64,
        /// Number of sample points, endpoints included
        #[arg(long, default_value_t = 101)]
        steps: u32,
        #[arg(long, default_value_t = 61)]
        width: usize,
        #[arg(long, default_value_t = 21)]
        height: usize,
    },
}

impl Commands {
    fn is_tui(&self) -> bool {
        match self {
            #[cfg(feature = "tui")]
            Commands::Tui => true,
            _ => false,
        }
    }
}

fn init_logging(cli: &Cli, tui: bool) -> Result<()> {
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    match &cli.log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        // The TUI owns the terminal; without a log file it logs nowhere.
        None if tui => {}
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn default_command() -> Option<Commands> {
    #[cfg(feature = "tui")]
    return Some(Commands::Tui);
    #[cfg(all(not(feature = "tui"), feature = "line"))]
    return Some(Commands::Line);
    #[cfg(not(any(feature = "tui", feature = "line")))]
    return None;
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.as_ref().map_or_else(default_command_is_tui, Commands::is_tui);
    init_logging(&cli, command)?;

    let angle_mode = if cli.degrees { AngleMode::Degree } else { AngleMode::Radian };
    let Some(command) = cli.command.or_else(default_command) else {
        bail!("no interactive mode was compiled in; use `eval`, `solve` or `plot`");
    };

    match command {
        #[cfg(feature = "tui")]
        Commands::Tui => tui_mode::run_tui(angle_mode)?,
        #[cfg(feature = "line")]
        Commands::Line => line_mode::run_line(angle_mode)?,
        Commands::Eval { expression } => {
            println!("{}", evaluate_expression(&expression, angle_mode)?);
        }
        Commands::Solve { equation, variable } => {
            let solution = solve_equation(&equation, variable)?;
            println!("{}", solution.describe(variable));
        }
        Commands::Plot { function, x_min, x_max, y_min, y_max, steps, width, height } => {
            if x_min >= x_max || y_min >= y_max {
                bail!("plot ranges must satisfy min < max");
            }
            let viewport = Viewport { x_range: (x_min, x_max), y_range: (y_min, y_max) };
            let sampler = sample_function(&function, viewport.x_range, viewport.y_range, steps)?
                .with_angle_mode(angle_mode);
            let points: Vec<_> = sampler.points().collect();
            debug!(function = %function, count = points.len(), "sampled plot");
            if points.is_empty() {
                bail!(EMPTY_PLOT_MESSAGE);
            }

            println!("y = {}", function);
            for row in render_ascii(&points, &viewport, width, height) {
                println!("{}", row);
            }
            println!(
                "x: [{}, {}]  y: [{}, {}]",
                format_number(x_min),
                format_number(x_max),
                format_number(y_min),
                format_number(y_max)
            );
        }
    }
    Ok(())
}

fn default_command_is_tui() -> bool {
    default_command().is_some_and(|command| command.is_tui())
}
