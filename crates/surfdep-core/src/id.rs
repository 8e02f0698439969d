//! Strongly-typed identifiers and the [`Site`] lattice coordinate.

use std::fmt;

/// A lattice site: column `x` and logical row `y`.
///
/// `y` is the logical height, unbounded by the physical buffer of the
/// rolling lattice. It is signed so that "below the substrate" can be
/// expressed by placement rules that inspect neighbourhoods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Site {
    /// Column index in `[0, L)`.
    pub x: usize,
    /// Logical row (height).
    pub y: i64,
}

impl Site {
    /// Construct a site from a column and a logical row.
    pub fn new(x: usize, y: i64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Identifies one simulation run within a batch of trials.
///
/// Assigned sequentially by the trial context; never reused within a
/// context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub u64);

impl ModelId {
    /// The id following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ModelId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
