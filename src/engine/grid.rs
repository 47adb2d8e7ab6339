use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::engine::numeric::{parse_row, RawNumber};
use crate::engine::types::{Axis, Field, Grid, GridError, GridPolicy, GridResult};
use crate::telemetry;

/// Owner of the price grid. All mutation goes through here.
///
/// Every mutating call validates and applies under one write-lock
/// acquisition, so callers never observe a grid that breaks rectangularity
/// and each call sees the result of every call before it.
#[derive(Debug)]
pub struct GridStore {
    grid: RwLock<Grid>,
    policy: GridPolicy,
}

impl GridStore {
    #[instrument(skip(grid), fields(heights = grid.heights.len(), widths = grid.widths.len()))]
    pub fn new(grid: Grid, policy: GridPolicy) -> Self {
        debug_assert!(grid.is_rectangular(), "seed grid must be rectangular");
        info!("Initialized price grid");
        telemetry::record_dimensions(&grid);
        Self { grid: RwLock::new(grid), policy }
    }

    pub fn policy(&self) -> GridPolicy {
        self.policy
    }

    /// Snapshot of the current grid. Changing it does not change the store.
    pub fn read(&self) -> Grid {
        self.grid.read().clone()
    }

    pub fn dimensions(&self) -> (usize, usize) {
        let g = self.grid.read();
        (g.heights.len(), g.widths.len())
    }

    pub fn position(&self, axis: Axis, label: f64) -> Option<usize> {
        self.grid.read().position(axis, label)
    }

    #[instrument(level = "debug", skip(self, row, col, value))]
    pub fn set_cell(
        &self,
        row: &RawNumber,
        col: &RawNumber,
        value: &RawNumber,
    ) -> GridResult<()> {
        let mut grid = self.grid.write();

        let result = Self::check_index(row, grid.heights.len(), Field::Row)
            .and_then(|r| Ok((r, Self::check_index(col, grid.widths.len(), Field::Col)?)))
            .and_then(|(r, c)| Ok((r, c, value.parse(Field::NewValue)?)));

        match result {
            Ok((r, c, v)) => {
                grid.prices[r][c] = v;
                debug!(row = r, col = c, value = v, "Cell updated");
                telemetry::record_op("set_cell", true);
                Ok(())
            }
            Err(e) => {
                warn!(?row, ?col, error = %e, "Rejecting cell update");
                telemetry::record_op("set_cell", false);
                Err(e)
            }
        }
    }

    #[instrument(level = "debug", skip(self, width))]
    pub fn append_column(&self, width: &RawNumber) -> GridResult<Grid> {
        let mut grid = self.grid.write();

        let label = match width
            .parse(Field::NewWidth)
            .and_then(|w| self.check_new_label(&grid, Axis::Width, w))
        {
            Ok(w) => w,
            Err(e) => {
                warn!(error = %e, "Rejecting new column");
                telemetry::record_op("append_column", false);
                return Err(e);
            }
        };

        grid.widths.push(label);
        let fill = self.policy.default_fill;
        for row in grid.prices.iter_mut() {
            row.push(fill);
        }

        debug!(width = label, widths = grid.widths.len(), "Column appended");
        telemetry::record_op("append_column", true);
        telemetry::record_dimensions(&grid);
        Ok(grid.clone())
    }

    #[instrument(level = "debug", skip(self, height, prices), fields(cells = prices.len()))]
    pub fn append_row(&self, height: &RawNumber, prices: &[RawNumber]) -> GridResult<Grid> {
        let mut grid = self.grid.write();

        let parsed = height
            .parse(Field::NewHeight)
            .and_then(|h| self.check_new_label(&grid, Axis::Height, h))
            .and_then(|h| {
                if prices.len() != grid.widths.len() {
                    return Err(GridError::LengthMismatch {
                        expected: grid.widths.len(),
                        got: prices.len(),
                    });
                }
                Ok((h, parse_row(prices)?))
            });

        let (label, row) = match parsed {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "Rejecting new row");
                telemetry::record_op("append_row", false);
                return Err(e);
            }
        };

        grid.heights.push(label);
        grid.prices.push(row);

        debug!(height = label, heights = grid.heights.len(), "Row appended");
        telemetry::record_op("append_row", true);
        telemetry::record_dimensions(&grid);
        Ok(grid.clone())
    }

    fn check_index(raw: &RawNumber, len: usize, field: Field) -> GridResult<usize> {
        let index = raw.parse_index(field)?;
        match usize::try_from(index) {
            Ok(i) if i < len => Ok(i),
            _ => Err(match field {
                Field::Col => GridError::ColOutOfRange { index, len },
                _ => GridError::RowOutOfRange { index, len },
            }),
        }
    }

    fn check_new_label(&self, grid: &Grid, axis: Axis, label: f64) -> GridResult<f64> {
        if self.policy.unique_labels && grid.position(axis, label).is_some() {
            return Err(GridError::DuplicateLabel { axis, label });
        }
        Ok(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(i: i64) -> RawNumber {
        RawNumber::from(i)
    }

    fn scenario_store() -> GridStore {
        let grid = Grid {
            heights: vec![10.0, 20.0],
            widths: vec![5.0],
            prices: vec![vec![100.0], vec![200.0]],
        };
        GridStore::new(grid, GridPolicy::default())
    }

    #[test]
    fn test_scenario() {
        let store = scenario_store();

        let g = store.append_column(&8.0.into()).unwrap();
        assert_eq!(g.widths, vec![5.0, 8.0]);
        assert_eq!(g.prices, vec![vec![100.0, 0.0], vec![200.0, 0.0]]);

        store.set_cell(&at(1), &at(1), &150.0.into()).unwrap();
        assert_eq!(store.read().prices, vec![vec![100.0, 0.0], vec![200.0, 150.0]]);

        let g = store.append_row(&30.0.into(), &[300.0.into(), 400.0.into()]).unwrap();
        assert_eq!(g.heights, vec![10.0, 20.0, 30.0]);
        assert_eq!(
            g.prices,
            vec![vec![100.0, 0.0], vec![200.0, 150.0], vec![300.0, 400.0]]
        );
    }

    #[test]
    fn test_set_cell_touches_one_cell() {
        let store = scenario_store();
        store.append_column(&8.0.into()).unwrap();
        let before = store.read();

        store.set_cell(&at(0), &at(1), &"42.5".into()).unwrap();

        let after = store.read();
        for (r, row) in after.prices.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                if (r, c) == (0, 1) {
                    assert_eq!(*v, 42.5);
                } else {
                    assert_eq!(*v, before.prices[r][c]);
                }
            }
        }
    }

    #[test]
    fn test_set_cell_rejections_leave_grid_alone() {
        let store = scenario_store();
        let before = store.read();

        assert_eq!(
            store.set_cell(&at(2), &at(0), &1.0.into()),
            Err(GridError::RowOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            store.set_cell(&at(-1), &at(0), &1.0.into()),
            Err(GridError::RowOutOfRange { index: -1, len: 2 })
        );
        assert_eq!(
            store.set_cell(&at(0), &at(1), &1.0.into()),
            Err(GridError::ColOutOfRange { index: 1, len: 1 })
        );
        assert_eq!(
            store.set_cell(&at(0), &at(0), &"ten".into()),
            Err(GridError::NotANumber { field: Field::NewValue })
        );
        assert_eq!(store.read(), before);
    }

    #[test]
    fn test_set_cell_rejects_non_integer_indices() {
        let store = scenario_store();
        let before = store.read();

        assert_eq!(
            store.set_cell(&0.5.into(), &at(0), &1.0.into()),
            Err(GridError::NotAnIndex { field: Field::Row })
        );
        assert_eq!(
            store.set_cell(&at(0), &"abc".into(), &1.0.into()),
            Err(GridError::NotAnIndex { field: Field::Col })
        );
        assert_eq!(
            store.set_cell(&1e19.into(), &at(0), &1.0.into()),
            Err(GridError::RowOutOfRange { index: i64::MAX, len: 2 })
        );
        assert_eq!(store.read(), before);

        store.set_cell(&"1.0".into(), &1.0.into(), &7.0.into()).unwrap();
        assert_eq!(store.read().prices[1][0], 7.0);
    }

    #[test]
    fn test_append_column_uses_policy_fill() {
        let grid = Grid { heights: vec![1.0], widths: vec![1.0], prices: vec![vec![9.0]] };
        let store = GridStore::new(grid, GridPolicy { default_fill: 75.0, unique_labels: true });
        assert_eq!(store.policy().default_fill, 75.0);
        let g = store.append_column(&2.0.into()).unwrap();
        assert_eq!(g.prices, vec![vec![9.0, 75.0]]);
    }

    #[test]
    fn test_append_column_rejects_bad_width() {
        let store = scenario_store();
        let before = store.read();
        assert_eq!(
            store.append_column(&"wide".into()),
            Err(GridError::NotANumber { field: Field::NewWidth })
        );
        assert_eq!(
            store.append_column(&5.0.into()),
            Err(GridError::DuplicateLabel { axis: Axis::Width, label: 5.0 })
        );
        assert_eq!(store.read(), before);
    }

    #[test]
    fn test_append_row_length_mismatch() {
        let store = scenario_store();
        let err = store.append_row(&30.0.into(), &[1.0.into(), 2.0.into()]);
        assert_eq!(err, Err(GridError::LengthMismatch { expected: 1, got: 2 }));
        assert_eq!(store.dimensions(), (2, 1));
    }

    #[test]
    fn test_append_row_bad_element_is_atomic() {
        let store = scenario_store();
        store.append_column(&8.0.into()).unwrap();
        let before = store.read();
        let err = store.append_row(&30.0.into(), &[1.0.into(), "x".into()]);
        assert_eq!(err, Err(GridError::NotANumber { field: Field::Price(1) }));
        assert_eq!(store.read(), before);
    }

    #[test]
    fn test_duplicates_allowed_when_policy_off() {
        let grid = Grid { heights: vec![10.0], widths: vec![5.0], prices: vec![vec![1.0]] };
        let store = GridStore::new(grid, GridPolicy { default_fill: 0.0, unique_labels: false });
        store.append_column(&5.0.into()).unwrap();
        store.append_row(&10.0.into(), &[2.0.into(), 3.0.into()]).unwrap();
        let g = store.read();
        assert_eq!(g.widths, vec![5.0, 5.0]);
        assert_eq!(g.heights, vec![10.0, 10.0]);
        // First match wins
        assert_eq!(store.position(Axis::Height, 10.0), Some(0));
    }

    #[test]
    fn test_read_is_a_snapshot() {
        let store = scenario_store();
        let mut snapshot = store.read();
        snapshot.prices[0].push(1.0);
        snapshot.heights.clear();
        assert!(store.read().is_rectangular());
        assert_eq!(store.dimensions(), (2, 1));
    }

    #[test]
    fn test_lookup_by_label() {
        let store = scenario_store();
        assert_eq!(store.position(Axis::Height, 20.0), Some(1));
        assert_eq!(store.position(Axis::Width, 7.0), None);
        assert_eq!(store.read().price_at(20.0, 5.0), Some(200.0));
        assert_eq!(store.read().price_at(30.0, 5.0), None);
    }
}
