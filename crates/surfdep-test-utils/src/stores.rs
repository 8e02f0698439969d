//! Instrumented page stores.

use std::sync::{Arc, Mutex};

use surfdep_series::{MemoryStore, PageStore, StoreError};

/// One call observed by a [`RecordingStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    Open,
    Close,
    Push { page: usize, len: usize },
    Pull { page: usize },
    Clear,
}

/// Wraps a [`MemoryStore`] and records every call into a shared log.
///
/// Clone the [`log`](Self::log) handle before moving the store into a
/// series to inspect the calls afterwards.
#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    log: Arc<Mutex<Vec<StoreEvent>>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Arc<Mutex<Vec<StoreEvent>>> {
        Arc::clone(&self.log)
    }

    fn record(&self, event: StoreEvent) {
        if let Ok(mut log) = self.log.lock() {
            log.push(event);
        }
    }
}

impl PageStore for RecordingStore {
    fn open(&mut self) -> Result<(), StoreError> {
        self.record(StoreEvent::Open);
        Ok(())
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.record(StoreEvent::Close);
        Ok(())
    }

    fn push_page(&mut self, page: usize, values: &[f64]) -> Result<(), StoreError> {
        self.record(StoreEvent::Push {
            page,
            len: values.len(),
        });
        self.inner.push_page(page, values)
    }

    fn pull_page(&mut self, page: usize) -> Result<Vec<f64>, StoreError> {
        self.record(StoreEvent::Pull { page });
        self.inner.pull_page(page)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.record(StoreEvent::Clear);
        self.inner.clear()
    }
}

/// A memory store whose pushes start failing after `ok_pushes` succeed.
#[derive(Debug)]
pub struct FailingStore {
    inner: MemoryStore,
    ok_pushes: usize,
    pushes: usize,
}

impl FailingStore {
    pub fn new(ok_pushes: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            ok_pushes,
            pushes: 0,
        }
    }
}

impl PageStore for FailingStore {
    fn push_page(&mut self, page: usize, values: &[f64]) -> Result<(), StoreError> {
        self.pushes += 1;
        if self.pushes > self.ok_pushes {
            return Err(StoreError::Io(std::io::Error::other(format!(
                "injected failure writing page {page}"
            ))));
        }
        self.inner.push_page(page, values)
    }

    fn pull_page(&mut self, page: usize) -> Result<Vec<f64>, StoreError> {
        self.inner.pull_page(page)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.pushes = 0;
        self.inner.clear()
    }
}
