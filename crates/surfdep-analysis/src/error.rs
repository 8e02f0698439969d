//! Analysis error type.

use std::error::Error;
use std::fmt;

use surfdep_series::SeriesError;

/// Errors raised while analysing a recorded width series.
#[derive(Debug)]
pub enum AnalysisError {
    /// Reading the series failed.
    Series(SeriesError),
    /// The requested window `[from, to)` holds no samples.
    EmptyWindow {
        /// First index of the window.
        from: u64,
        /// One past the last index of the window.
        to: u64,
    },
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Series(e) => write!(f, "series read failed: {e}"),
            Self::EmptyWindow { from, to } => {
                write!(f, "analysis window [{from}, {to}) holds no samples")
            }
        }
    }
}

impl Error for AnalysisError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Series(e) => Some(e),
            Self::EmptyWindow { .. } => None,
        }
    }
}

impl From<SeriesError> for AnalysisError {
    fn from(e: SeriesError) -> Self {
        Self::Series(e)
    }
}
