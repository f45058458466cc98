//! Front-end state shared by the TUI and the line REPL: the active angle
//! mode, the equation variable, the graph viewport and the history log.

use tracing::{debug, info};

use crate::calc_engine::{
    evaluate_expression, sample_function, solve_equation, validate_variable, AngleMode, Expr,
    SamplePoint, Viewport, PLOT_VARIABLE,
};
use crate::history::{History, HistoryEntry};

/// Points per graph: the x range is cut into 100 equal steps.
pub const GRAPH_STEPS: u32 = 101;

pub const EMPTY_PLOT_MESSAGE: &str = "No valid points to display in the current range";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Calculator,
    Equation,
    Graph,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Calculator, Tab::Equation, Tab::Graph];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Calculator => "Calculator",
            Tab::Equation => "Equation",
            Tab::Graph => "Graph",
        }
    }

    pub fn next(self) -> Tab {
        match self {
            Tab::Calculator => Tab::Equation,
            Tab::Equation => Tab::Graph,
            Tab::Graph => Tab::Calculator,
        }
    }

    pub fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }
}

/// What a submitted line did.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Blank input.
    Ignored,
    /// A setting changed; nothing was added to the history.
    Notice(String),
    /// A new history entry was appended.
    Recorded,
}

#[derive(Debug, Clone)]
pub struct Plot {
    pub label: String,
    pub expr: Expr,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub angle_mode: AngleMode,
    pub variable: char,
    pub viewport: Viewport,
    pub history: History,
    pub plot: Option<Plot>,
}

impl Default for Session {
    fn default() -> Self {
        Session::new(AngleMode::Radian)
    }
}

impl Session {
    pub fn new(angle_mode: AngleMode) -> Self {
        Session {
            angle_mode,
            variable: 'x',
            viewport: Viewport::default(),
            history: History::new(),
            plot: None,
        }
    }

    pub fn toggle_angle_mode(&mut self) -> AngleMode {
        self.angle_mode = self.angle_mode.toggled();
        info!(angle_mode = self.angle_mode.label(), "angle mode changed");
        self.angle_mode
    }

    /// Handles one line of input for `tab`. Settings commands (`deg`, `rad`,
    /// `clear`, `var <letter>`) are accepted on every tab.
    pub fn submit(&mut self, tab: Tab, input: &str) -> Response {
        let input = input.trim();
        if input.is_empty() {
            return Response::Ignored;
        }

        let lowered = input.to_lowercase();
        match lowered.as_str() {
            "clear" | "reset" => {
                self.history.clear();
                self.plot = None;
                return Response::Notice("History cleared".to_string());
            }
            "deg" => {
                self.angle_mode = AngleMode::Degree;
                return Response::Notice("Angle mode: DEG".to_string());
            }
            "rad" => {
                self.angle_mode = AngleMode::Radian;
                return Response::Notice("Angle mode: RAD".to_string());
            }
            _ => {}
        }

        if lowered.starts_with("var ") {
            let name = input.get(4..).unwrap_or_default().trim();
            return match validate_variable(name) {
                Ok(variable) => {
                    self.variable = variable;
                    Response::Notice(format!("Variable: {}", variable))
                }
                Err(e) => Response::Notice(e.to_string()),
            };
        }

        let entry = match tab {
            Tab::Calculator => self.calculate(input),
            Tab::Equation => self.solve(input, self.variable),
            Tab::Graph => self.graph(input),
        };
        self.history.push(entry);
        Response::Recorded
    }

    fn calculate(&self, input: &str) -> HistoryEntry {
        let result = evaluate_expression(input, self.angle_mode).map_err(|e| e.to_string());
        HistoryEntry::new(input, result)
    }

    /// Solves `input` for `variable` and labels the entry `Solve: ...`.
    pub fn solve(&self, input: &str, variable: char) -> HistoryEntry {
        let result = solve_equation(input, variable)
            .map(|solution| solution.describe(variable))
            .map_err(|e| e.to_string());
        HistoryEntry::new(format!("Solve: {}", input), result)
    }

    fn graph(&mut self, input: &str) -> HistoryEntry {
        let label = format!("Graph: {}", input);
        let sampler = match sample_function(input, self.viewport.x_range, self.viewport.y_range, GRAPH_STEPS) {
            Ok(sampler) => sampler,
            Err(e) => {
                self.plot = None;
                return HistoryEntry::new(label, Err(e.to_string()));
            }
        };

        self.plot = Some(Plot {
            label: input.to_string(),
            expr: sampler.expr().clone(),
        });
        let result = if self.plot_points().is_empty() {
            Err(EMPTY_PLOT_MESSAGE.to_string())
        } else {
            Ok("Displayed".to_string())
        };
        HistoryEntry::new(label, result)
    }

    /// Points of the current plot in the current viewport.
    pub fn plot_points(&self) -> Vec<SamplePoint> {
        match &self.plot {
            Some(plot) => {
                let sampler = self
                    .viewport
                    .sampler(plot.expr.clone(), GRAPH_STEPS)
                    .with_angle_mode(self.angle_mode);
                let points: Vec<SamplePoint> = sampler.points().collect();
                debug!(
                    function = %plot.label,
                    variable = %PLOT_VARIABLE,
                    count = points.len(),
                    "sampled plot"
                );
                points
            }
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn last_result(session: &Session) -> Result<String, String> {
        session.history.last().unwrap().result.clone()
    }

    #[test]
    fn test_calculator_tab_records_result() {
        let mut session = Session::default();
        assert_eq!(session.submit(Tab::Calculator, "2 * (3 + 4)"), Response::Recorded);
        assert_eq!(last_result(&session), Ok("14".to_string()));
        assert_eq!(session.history.last().unwrap().input, "2 * (3 + 4)");
    }

    #[test]
    fn test_errors_are_recorded_as_messages() {
        let mut session = Session::default();
        session.submit(Tab::Calculator, "1/0");
        assert_eq!(last_result(&session), Err("division by zero".to_string()));
    }

    #[test]
    fn test_angle_mode_commands() {
        let mut session = Session::default();
        assert_eq!(
            session.submit(Tab::Calculator, "deg"),
            Response::Notice("Angle mode: DEG".to_string())
        );
        session.submit(Tab::Calculator, "sin(90)");
        assert_eq!(last_result(&session), Ok("1".to_string()));
        assert_eq!(session.toggle_angle_mode(), AngleMode::Radian);
    }

    #[test]
    fn test_equation_tab_uses_selected_variable() {
        let mut session = Session::default();
        session.submit(Tab::Equation, "x^2 - 5x + 6 = 0");
        assert_eq!(last_result(&session), Ok("x = 3 or x = 2".to_string()));
        assert_eq!(session.history.last().unwrap().input, "Solve: x^2 - 5x + 6 = 0");

        assert_eq!(
            session.submit(Tab::Equation, "var t"),
            Response::Notice("Variable: t".to_string())
        );
        session.submit(Tab::Equation, "2t = 5");
        assert_eq!(last_result(&session), Ok("t = 2.5".to_string()));
    }

    #[test]
    fn test_invalid_variable_command() {
        let mut session = Session::default();
        let response = session.submit(Tab::Equation, "var xy");
        assert_eq!(
            response,
            Response::Notice("'xy' is not a valid variable name".to_string())
        );
        assert_eq!(session.variable, 'x');
    }

    #[test]
    fn test_graph_tab() {
        let mut session = Session::default();
        session.submit(Tab::Graph, "sin(x)");
        assert_eq!(last_result(&session), Ok("Displayed".to_string()));
        assert_eq!(session.plot_points().len(), GRAPH_STEPS as usize);

        session.submit(Tab::Graph, "x + 100");
        assert_eq!(last_result(&session), Err(EMPTY_PLOT_MESSAGE.to_string()));

        session.viewport.zoom_out();
        session.viewport.widen_x();
        assert!(session.plot_points().is_empty());
    }

    #[test]
    fn test_graph_parse_error_clears_plot() {
        let mut session = Session::default();
        session.submit(Tab::Graph, "x^2");
        assert!(session.plot.is_some());
        session.submit(Tab::Graph, "x^");
        assert!(session.plot.is_none());
        assert!(last_result(&session).is_err());
    }

    #[test]
    fn test_clear() {
        let mut session = Session::default();
        session.submit(Tab::Calculator, "1");
        session.submit(Tab::Calculator, "  ");
        assert_eq!(session.history.len(), 1);
        session.submit(Tab::Calculator, "clear");
        assert!(session.history.is_empty());
    }

    #[test]
    fn test_tab_cycle() {
        assert_eq!(Tab::Calculator.next(), Tab::Equation);
        assert_eq!(Tab::Graph.next(), Tab::Calculator);
        assert_eq!(Tab::Graph.index(), 2);
    }
}
