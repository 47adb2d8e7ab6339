use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Value given to every cell of a freshly appended column.
pub const DEFAULT_FILL: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Height,
    Width,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Height => write!(f, "height"),
            Axis::Width => write!(f, "width"),
        }
    }
}

// Row i belongs to heights[i], column j of every row belongs to widths[j].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Grid {
    pub heights: Vec<f64>,
    pub widths: Vec<f64>,
    pub prices: Vec<Vec<f64>>,
}

impl Grid {
    pub fn axis(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::Height => &self.heights,
            Axis::Width => &self.widths,
        }
    }

    /// Index of the first label exactly equal to `label`, if any.
    pub fn position(&self, axis: Axis, label: f64) -> Option<usize> {
        self.axis(axis).iter().position(|l| *l == label)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<f64> {
        self.prices.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Price at the intersection of a height label and a width label.
    pub fn price_at(&self, height: f64, width: f64) -> Option<f64> {
        let row = self.position(Axis::Height, height)?;
        let col = self.position(Axis::Width, width)?;
        self.cell(row, col)
    }

    pub fn is_rectangular(&self) -> bool {
        self.prices.len() == self.heights.len()
            && self.prices.iter().all(|r| r.len() == self.widths.len())
    }
}

/// Knobs that change how the store validates and grows the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPolicy {
    pub default_fill: f64,
    pub unique_labels: bool,
}

impl Default for GridPolicy {
    fn default() -> Self {
        Self { default_fill: DEFAULT_FILL, unique_labels: true }
    }
}

/// Input field a validation failure refers to, named as callers send it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Row,
    Col,
    NewValue,
    NewWidth,
    NewHeight,
    Price(usize),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Row => write!(f, "row"),
            Field::Col => write!(f, "col"),
            Field::NewValue => write!(f, "newValue"),
            Field::NewWidth => write!(f, "newWidth"),
            Field::NewHeight => write!(f, "newHeight"),
            Field::Price(i) => write!(f, "prices[{}]", i),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("row index {index} out of range (grid has {len} rows)")]
    RowOutOfRange { index: i64, len: usize },
    #[error("col index {index} out of range (grid has {len} columns)")]
    ColOutOfRange { index: i64, len: usize },
    #[error("{field} is not a finite number")]
    NotANumber { field: Field },
    #[error("{field} is not an integer index")]
    NotAnIndex { field: Field },
    #[error("prices has {got} values but the grid has {expected} widths")]
    LengthMismatch { expected: usize, got: usize },
    #[error("{axis} {label} already exists")]
    DuplicateLabel { axis: Axis, label: f64 },
}

impl GridError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }
}

pub type GridResult<T> = Result<T, GridError>;
