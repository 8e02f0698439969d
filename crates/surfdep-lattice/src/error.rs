//! Error types for lattice construction and access.

use std::fmt;

/// Errors arising from lattice construction or cell access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LatticeError {
    /// A column outside `[0, L)` or a negative row was addressed.
    OutOfRange {
        /// The requested column.
        x: i64,
        /// The requested logical row.
        y: i64,
        /// Lattice width `L`.
        width: usize,
    },
    /// Lattice dimensions violate `L > 0`, `0 < dH <= H` or `dH` even.
    InvalidDimensions {
        /// Which constraint failed.
        reason: String,
    },
    /// A placement rule has no site left to fill.
    NoGrowthSite,
}

impl fmt::Display for LatticeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { x, y, width } => {
                write!(f, "site ({x}, {y}) out of range for lattice of width {width}")
            }
            Self::InvalidDimensions { reason } => write!(f, "invalid lattice dimensions: {reason}"),
            Self::NoGrowthSite => write!(f, "no growth site left to fill"),
        }
    }
}

impl std::error::Error for LatticeError {}
