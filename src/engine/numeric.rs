//! Parsing of caller-supplied values into numbers.
//!
//! Every numeric field goes through here before the store touches the grid,
//! so a rejected value never leaves a half-applied mutation behind.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::types::{Field, GridError, GridResult};

/// A value as it arrives from a caller, before it is known to be a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
    Other(Value),
}

impl Default for RawNumber {
    fn default() -> Self {
        RawNumber::Other(Value::Null)
    }
}

impl From<f64> for RawNumber {
    fn from(v: f64) -> Self {
        RawNumber::Number(v)
    }
}

impl From<i64> for RawNumber {
    fn from(v: i64) -> Self {
        RawNumber::Number(v as f64)
    }
}

impl From<&str> for RawNumber {
    fn from(s: &str) -> Self {
        RawNumber::Text(s.to_string())
    }
}

impl RawNumber {
    /// Finite `f64` or `NotANumber` for `field`.
    pub fn parse(&self, field: Field) -> GridResult<f64> {
        let parsed = match self {
            RawNumber::Number(v) => Some(*v),
            RawNumber::Text(s) => s.trim().parse::<f64>().ok(),
            RawNumber::Other(_) => None,
        };
        match parsed {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(GridError::NotANumber { field }),
        }
    }

    /// Signed integer index. Out-of-range checks belong to the store.
    ///
    /// Numbers and numeric strings must both be integral. Values past the
    /// `i64` range saturate, so the store reports them as out of range.
    pub fn parse_index(&self, field: Field) -> GridResult<i64> {
        let v = match self {
            RawNumber::Number(v) => Some(*v),
            RawNumber::Text(s) => s.trim().parse::<f64>().ok(),
            RawNumber::Other(_) => None,
        };
        match v {
            Some(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
            _ => Err(GridError::NotAnIndex { field }),
        }
    }
}

/// Parse a whole row, failing on the first bad element.
pub fn parse_row(values: &[RawNumber]) -> GridResult<Vec<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| v.parse(Field::Price(i)))
        .collect()
}
