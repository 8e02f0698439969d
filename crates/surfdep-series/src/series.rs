//! The paged, append-only series.

use std::ops::Range;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{SeriesError, StoreError};
use crate::store::PageStore;

/// Upper bound on entries per page: `i32::MAX >> 6`, about 33.5M values
/// or 256 MiB of `f64`.
pub const MAX_PAGE_LEN: usize = (i32::MAX >> 6) as usize;

/// A paging transfer between memory and the backing store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PagingOp {
    /// The working page is written out.
    Push {
        /// Page index.
        page: usize,
    },
    /// A page is read into the working page.
    Pull {
        /// Page index.
        page: usize,
    },
}

/// Side-channel notifications around paging, for progress indication.
///
/// Observers have no influence on the series' contents.
pub trait PagingObserver: Send {
    /// A transfer is about to begin.
    fn on_paging_started(&mut self, op: PagingOp);

    /// A transfer finished successfully after `elapsed`.
    fn on_paging_completed(&mut self, op: PagingOp, elapsed: Duration);
}

/// Cumulative paging counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PagingStats {
    /// Pages written to the store.
    pub pushes: u64,
    /// Pages read from the store.
    pub pulls: u64,
    /// Total time spent in store transfers.
    pub elapsed: Duration,
}

/// An append-only `f64` sequence with one page resident at a time.
///
/// Values are addressed by a `u64` index. Reading or writing an index
/// outside the resident page writes the resident page back (if dirty)
/// and loads the page holding the index; callers never observe a
/// half-paged state. A page that has never been written is not read
/// from the store; its slots start as `NaN`.
///
/// # Examples
///
/// ```
/// use surfdep_series::{MemoryStore, PagedSeries};
///
/// let mut series = PagedSeries::new(MemoryStore::new(), 4).unwrap();
/// for i in 0..10 {
///     series.append(i as f64).unwrap();
/// }
/// assert_eq!(series.len(), 10);
/// assert_eq!(series.get(1).unwrap(), 1.0);
/// assert_eq!(series.get(9).unwrap(), 9.0);
/// assert!(series.get(10).is_err());
/// ```
pub struct PagedSeries<S: PageStore> {
    store: S,
    page_len: usize,
    working: Vec<f64>,
    resident: Option<usize>,
    dirty: Vec<bool>,
    used: Vec<bool>,
    len: u64,
    stats: PagingStats,
    observer: Option<Box<dyn PagingObserver>>,
}

impl<S: PageStore> PagedSeries<S> {
    /// Open `store` and build an empty series with `page_len` entries
    /// per page. `page_len` is clamped to `[1, MAX_PAGE_LEN]`.
    pub fn new(mut store: S, page_len: usize) -> Result<Self, SeriesError> {
        store.open()?;
        Ok(Self {
            store,
            page_len: page_len.clamp(1, MAX_PAGE_LEN),
            working: Vec::new(),
            resident: None,
            dirty: Vec::new(),
            used: Vec::new(),
            len: 0,
            stats: PagingStats::default(),
            observer: None,
        })
    }

    /// Build a series whose page holds `capacity_hint` entries, capped at
    /// [`MAX_PAGE_LEN`]. A run expected to record at most `N` values
    /// then never pages at all when `N <= MAX_PAGE_LEN`.
    pub fn with_capacity_hint(store: S, capacity_hint: u64) -> Result<Self, SeriesError> {
        let page_len = usize::try_from(capacity_hint).unwrap_or(MAX_PAGE_LEN);
        Self::new(store, page_len)
    }

    /// Append `value` at index [`len()`](Self::len).
    pub fn append(&mut self, value: f64) -> Result<(), SeriesError> {
        let (page, offset) = self.split(self.len);
        self.ensure_resident(page)?;
        self.working[offset] = value;
        self.dirty[page] = true;
        self.len += 1;
        Ok(())
    }

    /// Value at `index`.
    ///
    /// # Errors
    ///
    /// [`SeriesError::OutOfRange`] if `index >= len()`;
    /// [`SeriesError::Store`] if paging fails.
    pub fn get(&mut self, index: u64) -> Result<f64, SeriesError> {
        if index >= self.len {
            return Err(SeriesError::OutOfRange {
                index,
                len: self.len,
            });
        }
        let (page, offset) = self.split(index);
        self.ensure_resident(page)?;
        Ok(self.working[offset])
    }

    /// Values for every index in `range`.
    ///
    /// A range reaching past [`len`](Self::len) fails up front with the
    /// first missing index, without touching the store.
    pub fn read_range(&mut self, range: Range<u64>) -> Result<Vec<f64>, SeriesError> {
        if range.start < range.end && range.end > self.len {
            return Err(SeriesError::OutOfRange {
                index: range.start.max(self.len),
                len: self.len,
            });
        }
        let mut out = Vec::with_capacity(range.end.saturating_sub(range.start) as usize);
        for i in range {
            out.push(self.get(i)?);
        }
        Ok(out)
    }

    /// Number of values appended.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entries per page.
    pub fn page_len(&self) -> usize {
        self.page_len
    }

    /// Index of the resident page, if any.
    pub fn resident_page(&self) -> Option<usize> {
        self.resident
    }

    /// Paging counters since construction or the last [`clear`](Self::clear).
    pub fn stats(&self) -> PagingStats {
        self.stats
    }

    /// Attach a paging observer, replacing any previous one.
    pub fn set_observer(&mut self, observer: Box<dyn PagingObserver>) {
        self.observer = Some(observer);
    }

    /// Detach the paging observer.
    pub fn clear_observer(&mut self) -> Option<Box<dyn PagingObserver>> {
        self.observer.take()
    }

    /// Borrow the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Write the resident page back if it has unsaved values, then wait
    /// for the store to apply every page handed to it.
    ///
    /// A pipelined store accepts a push before writing it; a write that
    /// failed since then is reported here.
    pub fn flush(&mut self) -> Result<(), SeriesError> {
        if let Some(page) = self.resident {
            if self.dirty[page] {
                self.page_out(page)?;
            }
        }
        self.store.sync()?;
        Ok(())
    }

    /// Drop every value and every stored page.
    pub fn clear(&mut self) -> Result<(), SeriesError> {
        self.store.clear()?;
        self.resident = None;
        self.dirty.clear();
        self.used.clear();
        self.len = 0;
        self.stats = PagingStats::default();
        Ok(())
    }

    /// [`clear`](Self::clear), then switch to `page_len` entries per page.
    pub fn reset(&mut self, page_len: usize) -> Result<(), SeriesError> {
        self.clear()?;
        let page_len = page_len.clamp(1, MAX_PAGE_LEN);
        if page_len != self.page_len {
            self.page_len = page_len;
            self.working = Vec::new();
        }
        Ok(())
    }

    /// Flush, close the store and hand it back.
    pub fn close(mut self) -> Result<S, SeriesError> {
        self.flush()?;
        self.store.close()?;
        Ok(self.store)
    }

    fn split(&self, index: u64) -> (usize, usize) {
        let page_len = self.page_len as u64;
        ((index / page_len) as usize, (index % page_len) as usize)
    }

    fn ensure_resident(&mut self, page: usize) -> Result<(), SeriesError> {
        if self.resident == Some(page) {
            return Ok(());
        }
        if let Some(current) = self.resident {
            if self.dirty[current] {
                self.page_out(current)?;
            }
        }
        self.resident = None;
        if self.dirty.len() <= page {
            self.dirty.resize(page + 1, false);
            self.used.resize(page + 1, false);
        }
        if self.working.len() != self.page_len {
            self.working = vec![f64::NAN; self.page_len];
        }
        if self.used[page] {
            self.page_in(page)?;
        } else {
            self.working.fill(f64::NAN);
            self.used[page] = true;
        }
        self.resident = Some(page);
        Ok(())
    }

    fn page_out(&mut self, page: usize) -> Result<(), SeriesError> {
        let op = PagingOp::Push { page };
        let started = self.begin(op);
        self.store.push_page(page, &self.working)?;
        self.dirty[page] = false;
        self.stats.pushes += 1;
        self.finish(op, started);
        Ok(())
    }

    fn page_in(&mut self, page: usize) -> Result<(), SeriesError> {
        let op = PagingOp::Pull { page };
        let started = self.begin(op);
        let values = self.store.pull_page(page)?;
        if values.len() > self.page_len {
            return Err(StoreError::Corrupt {
                page,
                detail: format!(
                    "holds {} values, page length is {}",
                    values.len(),
                    self.page_len
                ),
            }
            .into());
        }
        self.working[..values.len()].copy_from_slice(&values);
        self.working[values.len()..].fill(f64::NAN);
        self.stats.pulls += 1;
        self.finish(op, started);
        Ok(())
    }

    fn begin(&mut self, op: PagingOp) -> Instant {
        if let Some(obs) = self.observer.as_mut() {
            obs.on_paging_started(op);
        }
        Instant::now()
    }

    fn finish(&mut self, op: PagingOp, started: Instant) {
        let elapsed = started.elapsed();
        self.stats.elapsed += elapsed;
        debug!(?op, elapsed_ms = elapsed.as_millis() as u64, "paging completed");
        if let Some(obs) = self.observer.as_mut() {
            obs.on_paging_completed(op, elapsed);
        }
    }
}

impl<S: PageStore> std::fmt::Debug for PagedSeries<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedSeries")
            .field("len", &self.len)
            .field("page_len", &self.page_len)
            .field("resident", &self.resident)
            .field("stats", &self.stats)
            .finish()
    }
}
