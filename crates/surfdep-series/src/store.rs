//! The [`PageStore`] trait and the in-memory store.

use indexmap::IndexMap;

use crate::error::StoreError;

/// External storage for pages of a [`PagedSeries`](crate::PagedSeries).
///
/// The series guarantees a single writer and a single reader: at most
/// one page is resident, and every page is written out before another
/// is read in. Stores therefore need no internal locking.
pub trait PageStore: Send {
    /// Acquire the backing medium. Called once when a series is built.
    fn open(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Release the backing medium.
    fn close(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Persist `values` as page `page`, replacing any earlier contents.
    fn push_page(&mut self, page: usize, values: &[f64]) -> Result<(), StoreError>;

    /// Load page `page`. A page never pushed yields an empty vector.
    fn pull_page(&mut self, page: usize) -> Result<Vec<f64>, StoreError>;

    /// Drop every stored page.
    fn clear(&mut self) -> Result<(), StoreError>;

    /// Wait until every accepted push is durable in the store, and
    /// report any push that failed after it was accepted.
    ///
    /// Stores that write synchronously have nothing to wait for.
    fn sync(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl<S: PageStore + ?Sized> PageStore for Box<S> {
    fn open(&mut self) -> Result<(), StoreError> {
        (**self).open()
    }

    fn close(&mut self) -> Result<(), StoreError> {
        (**self).close()
    }

    fn push_page(&mut self, page: usize, values: &[f64]) -> Result<(), StoreError> {
        (**self).push_page(page, values)
    }

    fn pull_page(&mut self, page: usize) -> Result<Vec<f64>, StoreError> {
        (**self).pull_page(page)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        (**self).clear()
    }

    fn sync(&mut self) -> Result<(), StoreError> {
        (**self).sync()
    }
}

/// Keeps pages in a map in process memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    pages: IndexMap<usize, Vec<f64>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pages currently held.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Borrow a stored page.
    pub fn page(&self, page: usize) -> Option<&[f64]> {
        self.pages.get(&page).map(Vec::as_slice)
    }
}

impl PageStore for MemoryStore {
    fn push_page(&mut self, page: usize, values: &[f64]) -> Result<(), StoreError> {
        self.pages.insert(page, values.to_vec());
        Ok(())
    }

    fn pull_page(&mut self, page: usize) -> Result<Vec<f64>, StoreError> {
        Ok(self.pages.get(&page).cloned().unwrap_or_default())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.pages.clear();
        Ok(())
    }
}
