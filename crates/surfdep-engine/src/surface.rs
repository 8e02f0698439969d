//! Height statistics and the surface width.

/// Average, minimum and maximum column height.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceStats {
    /// Mean of `height[]`.
    pub average_height: f64,
    /// Lowest column.
    pub min_height: i64,
    /// Highest column.
    pub max_height: i64,
}

impl SurfaceStats {
    /// Scan `heights` once. An empty slice yields the default.
    pub fn of(heights: &[i64]) -> Self {
        let (Some(&first), n) = (heights.first(), heights.len()) else {
            return Self::default();
        };
        let mut sum: i128 = 0;
        let mut min_height = first;
        let mut max_height = first;
        for &h in heights {
            sum += i128::from(h);
            min_height = min_height.min(h);
            max_height = max_height.max(h);
        }
        Self {
            average_height: sum as f64 / n as f64,
            min_height,
            max_height,
        }
    }
}

/// RMS deviation of `heights` from `average_height`:
/// `sqrt(mean((h - avg)^2))`. 0 for an empty slice.
pub fn surface_width(heights: &[i64], average_height: f64) -> f64 {
    if heights.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = heights
        .iter()
        .map(|&h| {
            let d = h as f64 - average_height;
            d * d
        })
        .sum();
    (sum_sq / heights.len() as f64).sqrt()
}
