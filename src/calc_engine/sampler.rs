//! Samples `y = f(x)` over a range for plotting.

use super::ast::Expr;
use super::eval::{evaluate, AngleMode, EvalContext};

/// The variable a plotted function is written in.
pub const PLOT_VARIABLE: char = 'x';

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
}

/// A plot of one expression. Call [`Sampler::points`] as many times as
/// needed; each call starts a fresh pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Sampler {
    expr: Expr,
    x_range: (f64, f64),
    y_range: (f64, f64),
    steps: u32,
    angle_mode: AngleMode,
}

impl Sampler {
    pub fn new(expr: Expr, x_range: (f64, f64), y_range: (f64, f64), steps: u32) -> Self {
        Sampler {
            expr,
            x_range,
            y_range,
            steps,
            angle_mode: AngleMode::Radian,
        }
    }

    pub fn with_angle_mode(mut self, angle_mode: AngleMode) -> Self {
        self.angle_mode = angle_mode;
        self
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn points(&self) -> SamplePoints<'_> {
        SamplePoints {
            sampler: self,
            index: 0,
        }
    }

    /// The `i`-th x value. The last one is exactly the range end.
    fn x_at(&self, i: u32) -> f64 {
        let (start, end) = self.x_range;
        if i + 1 >= self.steps {
            return if self.steps == 1 { start } else { end };
        }
        start + (end - start) * f64::from(i) / f64::from(self.steps - 1)
    }

    fn point_at(&self, x: f64) -> Option<SamplePoint> {
        let ctx = EvalContext::new(self.angle_mode).with_binding(PLOT_VARIABLE, x);
        let y = evaluate(&self.expr, &ctx).ok()?;
        let (low, high) = self.y_range;
        (y.is_finite() && y >= low && y <= high).then_some(SamplePoint { x, y })
    }
}

impl<'a> IntoIterator for &'a Sampler {
    type Item = SamplePoint;
    type IntoIter = SamplePoints<'a>;

    fn into_iter(self) -> SamplePoints<'a> {
        self.points()
    }
}

/// Lazy pass over a [`Sampler`]'s x values, skipping points that fail to
/// evaluate or fall outside the y range.
#[derive(Debug, Clone)]
pub struct SamplePoints<'a> {
    sampler: &'a Sampler,
    index: u32,
}

impl Iterator for SamplePoints<'_> {
    type Item = SamplePoint;

    fn next(&mut self) -> Option<SamplePoint> {
        while self.index < self.sampler.steps {
            let x = self.sampler.x_at(self.index);
            self.index += 1;
            if let Some(point) = self.sampler.point_at(x) {
                return Some(point);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some((self.sampler.steps - self.index) as usize))
    }
}

pub const DEFAULT_RANGE: (f64, f64) = (-10.0, 10.0);

/// Visible window of a graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            x_range: DEFAULT_RANGE,
            y_range: DEFAULT_RANGE,
        }
    }
}

impl Viewport {
    const ZOOM_FACTOR: f64 = 1.5;

    pub fn zoom_in(&mut self) {
        self.x_range = (self.x_range.0 / Self::ZOOM_FACTOR, self.x_range.1 / Self::ZOOM_FACTOR);
        self.y_range = (self.y_range.0 / Self::ZOOM_FACTOR, self.y_range.1 / Self::ZOOM_FACTOR);
    }

    pub fn zoom_out(&mut self) {
        self.x_range = (self.x_range.0 * Self::ZOOM_FACTOR, self.x_range.1 * Self::ZOOM_FACTOR);
        self.y_range = (self.y_range.0 * Self::ZOOM_FACTOR, self.y_range.1 * Self::ZOOM_FACTOR);
    }

    pub fn widen_x(&mut self) {
        self.x_range = (self.x_range.0 - 2.0, self.x_range.1 + 2.0);
    }

    /// Shrinks x by one on each side while the window is wider than 4.
    pub fn narrow_x(&mut self) {
        if self.x_range.1 - self.x_range.0 > 4.0 {
            self.x_range = (self.x_range.0 + 1.0, self.x_range.1 - 1.0);
        }
    }

    pub fn reset(&mut self) {
        *self = Viewport::default();
    }

    pub fn sampler(&self, expr: Expr, steps: u32) -> Sampler {
        Sampler::new(expr, self.x_range, self.y_range, steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc_engine::lexer::tokenize;
    use crate::calc_engine::parser::parse;

    fn sampler(input: &str, x_range: (f64, f64), y_range: (f64, f64), steps: u32) -> Sampler {
        Sampler::new(parse(&tokenize(input).unwrap()).unwrap(), x_range, y_range, steps)
    }

    #[test]
    fn test_inclusive_evenly_spaced() {
        let s = sampler("x", (-1.0, 1.0), (-10.0, 10.0), 5);
        let xs: Vec<f64> = s.points().map(|p| p.x).collect();
        assert_eq!(xs, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_reciprocal_skips_zero() {
        let s = sampler("1/x", (-1.0, 1.0), (-100.0, 100.0), 3);
        let points: Vec<SamplePoint> = s.points().collect();
        assert_eq!(
            points,
            vec![SamplePoint { x: -1.0, y: -1.0 }, SamplePoint { x: 1.0, y: 1.0 }]
        );
    }

    #[test]
    fn test_out_of_range_points_are_dropped() {
        let s = sampler("x^2", (-4.0, 4.0), (0.0, 4.0), 9);
        let xs: Vec<f64> = s.points().map(|p| p.x).collect();
        assert_eq!(xs, vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_domain_errors_are_skipped() {
        let s = sampler("sqrt(x)", (-2.0, 2.0), (-10.0, 10.0), 5);
        assert_eq!(s.points().count(), 3);
    }

    #[test]
    fn test_restartable() {
        let s = sampler("x + 1", (0.0, 1.0), (-10.0, 10.0), 11);
        let first: Vec<SamplePoint> = s.points().collect();
        let second: Vec<SamplePoint> = (&s).into_iter().collect();
        assert_eq!(first.len(), 11);
        assert_eq!(first, second);
    }

    #[test]
    fn test_step_edge_cases() {
        assert_eq!(sampler("x", (0.0, 1.0), (-1.0, 1.0), 0).points().count(), 0);
        let single: Vec<SamplePoint> = sampler("x", (0.5, 1.0), (-1.0, 1.0), 1).points().collect();
        assert_eq!(single, vec![SamplePoint { x: 0.5, y: 0.5 }]);
    }

    #[test]
    fn test_last_point_hits_range_end() {
        let s = sampler("x", (-10.0, 10.0), (-100.0, 100.0), 101);
        assert_eq!(s.points().last().map(|p| p.x), Some(10.0));
    }

    #[test]
    fn test_unbound_variable_gives_empty_plot() {
        let s = sampler("y + 1", (-1.0, 1.0), (-10.0, 10.0), 10);
        assert_eq!(s.points().next(), None);
    }

    #[test]
    fn test_angle_mode() {
        let s = sampler("sin(x)", (90.0, 90.0), (-2.0, 2.0), 1).with_angle_mode(AngleMode::Degree);
        let y = s.points().next().unwrap().y;
        assert!((y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_viewport_zoom_and_reset() {
        let mut view = Viewport::default();
        view.zoom_out();
        assert_eq!(view.x_range, (-15.0, 15.0));
        view.zoom_in();
        assert_eq!(view.y_range, (-10.0, 10.0));
        view.widen_x();
        assert_eq!(view.x_range, (-12.0, 12.0));
        view.narrow_x();
        assert_eq!(view.x_range, (-11.0, 11.0));
        view.reset();
        assert_eq!(view, Viewport::default());
    }

    #[test]
    fn test_viewport_narrow_stops_at_four() {
        let mut view = Viewport {
            x_range: (-2.0, 2.0),
            y_range: DEFAULT_RANGE,
        };
        view.narrow_x();
        assert_eq!(view.x_range, (-2.0, 2.0));
    }
}
