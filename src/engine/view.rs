//! Filtered, label-addressed view of a grid for display.
//!
//! Selecting a single row or column by label goes through
//! [`Grid::position`]; a label that is not on the axis selects nothing
//! rather than pointing at an invalid index.

use std::str::FromStr;

use crate::engine::types::{Axis, Grid};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AxisFilter {
    #[default]
    All,
    Label(f64),
}

impl AxisFilter {
    fn select(&self, grid: &Grid, axis: Axis) -> Vec<usize> {
        match self {
            AxisFilter::All => (0..grid.axis(axis).len()).collect(),
            AxisFilter::Label(label) => grid.position(axis, *label).into_iter().collect(),
        }
    }
}

impl FromStr for AxisFilter {
    type Err = std::num::ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(AxisFilter::All);
        }
        s.parse().map(AxisFilter::Label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewRow {
    /// Position in the full grid, usable with `set_cell`.
    pub index: usize,
    pub height: f64,
    /// `(column index, price)` for each selected column.
    pub cells: Vec<(usize, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridView {
    pub columns: Vec<(usize, f64)>,
    pub rows: Vec<ViewRow>,
}

impl GridView {
    pub fn build(grid: &Grid, heights: AxisFilter, widths: AxisFilter) -> Self {
        let columns: Vec<(usize, f64)> = widths
            .select(grid, Axis::Width)
            .into_iter()
            .map(|j| (j, grid.widths[j]))
            .collect();

        let rows = heights
            .select(grid, Axis::Height)
            .into_iter()
            .map(|i| ViewRow {
                index: i,
                height: grid.heights[i],
                cells: columns
                    .iter()
                    .filter_map(|&(j, _)| grid.cell(i, j).map(|p| (j, p)))
                    .collect(),
            })
            .collect();

        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }
}

const CORNER: &str = "HEIGHT TO ↓ / WIDTH TO →";

fn label(v: f64) -> String {
    format!("{}\"", v)
}

fn price(v: f64) -> String {
    format!("${}", v)
}

/// Plain-text table: one header line of width labels, one line per height.
pub fn render_table(view: &GridView) -> String {
    let mut header = vec![CORNER.to_string()];
    header.extend(view.columns.iter().map(|&(_, w)| label(w)));

    let mut lines = vec![header];
    for row in &view.rows {
        let mut line = vec![label(row.height)];
        line.extend(row.cells.iter().map(|&(_, p)| price(p)));
        lines.push(line);
    }

    let ncols = lines.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..ncols)
        .map(|c| {
            lines
                .iter()
                .filter_map(|l| l.get(c))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for line in &lines {
        let cells: Vec<String> = line
            .iter()
            .enumerate()
            .map(|(c, s)| format!("{:>w$}", s, w = widths[c]))
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}
