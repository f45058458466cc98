//! Character-grid rendering of sampled points for plain terminals.

use crate::calc_engine::{SamplePoint, Viewport};

fn cell(value: f64, start: f64, end: f64, cells: usize) -> usize {
    let ratio = (value - start) / (end - start);
    (ratio * (cells - 1) as f64).round().clamp(0.0, (cells - 1) as f64) as usize
}

/// Draws `points` inside `viewport` on a `width` x `height` grid, one string
/// per row, top row first. Axes are drawn when the origin lines are visible.
pub fn render_ascii(points: &[SamplePoint], viewport: &Viewport, width: usize, height: usize) -> Vec<String> {
    let (x0, x1) = viewport.x_range;
    let (y0, y1) = viewport.y_range;
    if width < 2 || height < 2 || x1 <= x0 || y1 <= y0 {
        return Vec::new();
    }

    let mut grid = vec![vec![' '; width]; height];

    let axis_col = (x0..=x1).contains(&0.0).then(|| cell(0.0, x0, x1, width));
    let axis_row = (y0..=y1).contains(&0.0).then(|| height - 1 - cell(0.0, y0, y1, height));

    if let Some(row) = axis_row {
        grid[row].iter_mut().for_each(|c| *c = '-');
    }
    if let Some(col) = axis_col {
        for row in grid.iter_mut() {
            row[col] = if row[col] == '-' { '+' } else { '|' };
        }
    }

    for point in points {
        let col = cell(point.x, x0, x1, width);
        let row = height - 1 - cell(point.y, y0, y1, height);
        grid[row][col] = '*';
    }

    grid.into_iter().map(|row| row.into_iter().collect()).collect()
}
