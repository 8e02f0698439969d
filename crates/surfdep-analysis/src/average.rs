//! Running averages as plain values.

use indexmap::IndexMap;

/// A running mean and the number of samples behind it.
///
/// Updating returns a new value rather than mutating shared state:
/// `value' = (value * samples + x) / (samples + 1)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Average {
    /// Current mean. 0 when there are no samples.
    pub value: f64,
    /// Number of samples folded in.
    pub samples: u64,
}

impl Average {
    /// The mean after folding in `x`.
    #[must_use]
    pub fn with_sample(self, x: f64) -> Self {
        let n = self.samples as f64;
        Self {
            value: (self.value * n + x) / (n + 1.0),
            samples: self.samples + 1,
        }
    }
}

/// Averages kept for one `(L, scaled time)` cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnsembleEntry {
    /// Mean surface width across trials.
    pub width: Average,
    /// Mean average height across trials.
    pub height: Average,
}

/// Width and height averages across independent trials, keyed by
/// lattice width and scaled time.
///
/// Cells appear in the order they were first recorded. A single owner
/// updates the table through `&mut self`, so read-then-update needs no
/// further synchronisation.
#[derive(Clone, Debug, Default)]
pub struct EnsembleAverages {
    cells: IndexMap<(usize, u64), EnsembleEntry>,
}

impl EnsembleAverages {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one observation into the `(length, time)` cell and return
    /// the updated cell.
    pub fn record(&mut self, length: usize, time: u64, width: f64, height: f64) -> EnsembleEntry {
        let cell = self.cells.entry((length, time)).or_default();
        cell.width = cell.width.with_sample(width);
        cell.height = cell.height.with_sample(height);
        *cell
    }

    /// Look up a cell.
    pub fn get(&self, length: usize, time: u64) -> Option<&EnsembleEntry> {
        self.cells.get(&(length, time))
    }

    /// Cells for one lattice width, as `(time, entry)` in record order.
    pub fn for_length(&self, length: usize) -> impl Iterator<Item = (u64, &EnsembleEntry)> {
        self.cells
            .iter()
            .filter(move |((l, _), _)| *l == length)
            .map(|((_, t), e)| (*t, e))
    }

    /// Every cell as `((length, time), entry)`.
    pub fn iter(&self) -> impl Iterator<Item = (&(usize, u64), &EnsembleEntry)> {
        self.cells.iter()
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Drop every cell.
    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_mean() {
        let avg = [2.0, 4.0, 9.0]
            .into_iter()
            .fold(Average::default(), Average::with_sample);
        assert_eq!(avg.samples, 3);
        assert!((avg.value - 5.0).abs() < 1e-12);
    }

    #[test]
    fn ensemble_cells_are_independent() {
        let mut table = EnsembleAverages::new();
        table.record(16, 10, 1.0, 5.0);
        table.record(16, 10, 3.0, 7.0);
        table.record(32, 10, 8.0, 1.0);
        let cell = table.record(16, 20, 4.0, 9.0);
        assert_eq!(cell.width.samples, 1);

        let c = table.get(16, 10).unwrap();
        assert_eq!(c.width.value, 2.0);
        assert_eq!(c.height.value, 6.0);
        assert_eq!(c.width.samples, 2);
        assert_eq!(table.get(32, 10).unwrap().width.value, 8.0);

        let times: Vec<u64> = table.for_length(16).map(|(t, _)| t).collect();
        assert_eq!(times, vec![10, 20]);
        assert_eq!(table.len(), 3);
        table.clear();
        assert!(table.is_empty());
    }
}
