//! Per-run counters.

use surfdep_series::PagingStats;

/// Counters accumulated over one run.
///
/// Reset by every engine `init`. Snapshots are taken with
/// [`DepositionEngine::metrics`](crate::DepositionEngine::metrics).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunMetrics {
    /// Steps executed.
    pub steps: u64,
    /// Widths appended to the series.
    pub measurements: u64,
    /// Steps on which ensemble averages were due.
    pub averages_due: u64,
    /// Times the bottom half of the buffer was recycled.
    pub bottom_recycles: u64,
    /// Times the top half of the buffer was recycled.
    pub top_recycles: u64,
    /// Paging activity of the width series.
    pub paging: PagingStats,
}

impl RunMetrics {
    /// Total half-buffer recycles.
    pub fn recycles(&self) -> u64 {
        self.bottom_recycles + self.top_recycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = RunMetrics::default();
        assert_eq!(m.steps, 0);
        assert_eq!(m.measurements, 0);
        assert_eq!(m.recycles(), 0);
        assert_eq!(m.paging, PagingStats::default());
    }
}
