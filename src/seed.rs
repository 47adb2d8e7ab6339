//! Bootstrap data for the grid.
//!
//! Conversions between the on-disk seed and the in-memory `Grid`, file
//! loading, and construction of the store the server starts with.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::config::AppConfig;
use crate::engine::types::{Axis, Grid, GridPolicy};
use crate::engine::GridStore;

const BUILTIN_SEED: &str = include_str!("../data/seed.json");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("seed is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
    #[error("seed has {prices} price rows but {heights} heights")]
    RowCount { heights: usize, prices: usize },
    #[error("seed row {row} has {got} prices but there are {expected} widths")]
    RaggedRow { row: usize, expected: usize, got: usize },
    #[error("seed {what} contains a non-finite number")]
    NotFinite { what: &'static str },
    #[error("seed {axis} {label} appears more than once")]
    DuplicateLabel { axis: Axis, label: f64 },
}

pub type SeedResult<T> = Result<T, SeedError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedData {
    pub heights: Vec<f64>,
    pub widths: Vec<f64>,
    pub prices: Vec<Vec<f64>>,
}

impl SeedData {
    pub fn builtin() -> SeedResult<Self> {
        Ok(serde_json::from_str(BUILTIN_SEED)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> SeedResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Seed from `path` when given, otherwise the one compiled in.
    pub fn load(path: Option<&Path>) -> SeedResult<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Self::builtin(),
        }
    }
}

/// Build a `Grid` from a seed, refusing anything the store could not have produced.
pub fn into_grid(seed: SeedData, policy: &GridPolicy) -> SeedResult<Grid> {
    if seed.prices.len() != seed.heights.len() {
        return Err(SeedError::RowCount {
            heights: seed.heights.len(),
            prices: seed.prices.len(),
        });
    }
    for (row, cells) in seed.prices.iter().enumerate() {
        if cells.len() != seed.widths.len() {
            return Err(SeedError::RaggedRow {
                row,
                expected: seed.widths.len(),
                got: cells.len(),
            });
        }
    }

    if !seed.heights.iter().all(|v| v.is_finite()) {
        return Err(SeedError::NotFinite { what: "heights" });
    }
    if !seed.widths.iter().all(|v| v.is_finite()) {
        return Err(SeedError::NotFinite { what: "widths" });
    }
    if !seed.prices.iter().flatten().all(|v| v.is_finite()) {
        return Err(SeedError::NotFinite { what: "prices" });
    }

    if policy.unique_labels {
        check_unique(Axis::Height, &seed.heights)?;
        check_unique(Axis::Width, &seed.widths)?;
    }

    Ok(Grid {
        heights: seed.heights,
        widths: seed.widths,
        prices: seed.prices,
    })
}

pub fn from_grid(grid: &Grid) -> SeedData {
    SeedData {
        heights: grid.heights.clone(),
        widths: grid.widths.clone(),
        prices: grid.prices.clone(),
    }
}

/// Seed the store the service starts with.
pub fn bootstrap(config: &AppConfig) -> SeedResult<GridStore> {
    let policy = config.policy();
    let seed = SeedData::load(config.grid.seed_path.as_deref())?;
    let grid = into_grid(seed, &policy)?;
    Ok(GridStore::new(grid, policy))
}

fn check_unique(axis: Axis, labels: &[f64]) -> SeedResult<()> {
    for (i, label) in labels.iter().enumerate() {
        if labels[..i].contains(label) {
            return Err(SeedError::DuplicateLabel { axis, label: *label });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn seed(heights: Vec<f64>, widths: Vec<f64>, prices: Vec<Vec<f64>>) -> SeedData {
        SeedData { heights, widths, prices }
    }

    #[test]
    fn test_builtin_seed_is_valid() {
        let seed = SeedData::builtin().unwrap();
        let grid = into_grid(seed, &GridPolicy::default()).unwrap();
        assert!(grid.is_rectangular());
        assert!(!grid.heights.is_empty());
    }

    #[test]
    fn test_rejects_row_count_mismatch() {
        let s = seed(vec![1.0, 2.0], vec![1.0], vec![vec![1.0]]);
        assert!(matches!(
            into_grid(s, &GridPolicy::default()),
            Err(SeedError::RowCount { heights: 2, prices: 1 })
        ));
    }

    #[test]
    fn test_rejects_ragged_row() {
        let s = seed(vec![1.0, 2.0], vec![1.0, 2.0], vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(
            into_grid(s, &GridPolicy::default()),
            Err(SeedError::RaggedRow { row: 1, expected: 2, got: 1 })
        ));
    }

    #[test]
    fn test_duplicates_depend_on_policy() {
        let s = seed(vec![1.0, 1.0], vec![5.0], vec![vec![1.0], vec![2.0]]);
        assert!(matches!(
            into_grid(s.clone(), &GridPolicy::default()),
            Err(SeedError::DuplicateLabel { axis: Axis::Height, .. })
        ));
        let lenient = GridPolicy { unique_labels: false, ..GridPolicy::default() };
        assert!(into_grid(s, &lenient).is_ok());
    }

    #[test]
    fn test_load_from_file_and_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"heights":[10,20],"widths":[5],"prices":[[100],[200]]}}"#).unwrap();

        let loaded = SeedData::load(Some(file.path())).unwrap();
        let grid = into_grid(loaded.clone(), &GridPolicy::default()).unwrap();
        assert_eq!(grid.prices, vec![vec![100.0], vec![200.0]]);
        assert_eq!(from_grid(&grid), loaded);
    }

    #[test]
    fn test_bootstrap_uses_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"heights":[10],"widths":[5,5],"prices":[[1,2]]}}"#).unwrap();

        let mut config = AppConfig::default();
        config.grid.seed_path = Some(file.path().to_path_buf());
        assert!(matches!(
            bootstrap(&config),
            Err(SeedError::DuplicateLabel { axis: Axis::Width, .. })
        ));

        config.grid.unique_labels = false;
        let store = bootstrap(&config).unwrap();
        assert_eq!(store.dimensions(), (1, 2));
    }

    #[test]
    fn test_load_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(matches!(SeedData::from_file(file.path()), Err(SeedError::Format(_))));
    }
}
