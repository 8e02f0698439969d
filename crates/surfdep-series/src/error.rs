//! Error types for paged series and their backing stores.

use std::error::Error;
use std::fmt;
use std::io;

/// Errors raised by a [`PageStore`](crate::PageStore).
#[derive(Debug)]
pub enum StoreError {
    /// An I/O error in the backing medium.
    Io(io::Error),
    /// A stored page could not be decoded.
    Corrupt {
        /// Index of the damaged page.
        page: usize,
        /// What was wrong with it.
        detail: String,
    },
    /// The store was used before `open()` or after `close()`.
    Closed,
    /// The background I/O worker has exited.
    WorkerGone,
    /// A pipelined push failed on the background worker. Reported by
    /// every later request until the store is cleared.
    PushFailed {
        /// The page that was not written.
        page: usize,
        /// The inner store's error, rendered.
        detail: String,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Corrupt { page, detail } => write!(f, "page {page} is corrupt: {detail}"),
            Self::Closed => write!(f, "page store is closed"),
            Self::WorkerGone => write!(f, "page store worker has exited"),
            Self::PushFailed { page, detail } => {
                write!(f, "background write of page {page} failed: {detail}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Errors raised by [`PagedSeries`](crate::PagedSeries).
#[derive(Debug)]
pub enum SeriesError {
    /// `index` is not below the number of appended values.
    OutOfRange {
        /// The requested index.
        index: u64,
        /// Number of values appended so far.
        len: u64,
    },
    /// Paging to or from the backing store failed.
    Store(StoreError),
}

impl fmt::Display for SeriesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { index, len } => {
                write!(f, "index {index} out of range for series of length {len}")
            }
            Self::Store(e) => write!(f, "paging failed: {e}"),
        }
    }
}

impl Error for SeriesError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            Self::OutOfRange { .. } => None,
        }
    }
}

impl From<StoreError> for SeriesError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}
