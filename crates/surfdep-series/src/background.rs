//! Runs any [`PageStore`] on a dedicated I/O thread.
//!
//! The worker owns the inner store exclusively (moved in at spawn).
//! Requests arrive over a bounded crossbeam channel. Pushes are
//! pipelined: the caller hands over a copy of the page and continues
//! without waiting. Pulls, clears and closes wait for a reply on a
//! per-request channel, which also orders them after every earlier push.
//!
//! A failed push cannot be reported to the caller that issued it. The
//! worker latches the first such failure and returns it from every
//! later request that carries a reply, until a successful `clear`
//! discards the pages it was writing.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::store::PageStore;

const WORKER_NAME: &str = "surfdep-page-store";

/// Default number of requests that may queue before pushes block.
pub const DEFAULT_QUEUE_DEPTH: usize = 4;

type Reply<T> = Sender<Result<T, StoreError>>;

enum Request {
    Open(Reply<()>),
    Close(Reply<()>),
    Push { page: usize, values: Vec<f64> },
    Pull { page: usize, reply: Reply<Vec<f64>> },
    Clear(Reply<()>),
    Sync(Reply<()>),
    Shutdown,
}

#[derive(Clone, Debug)]
struct PushFailure {
    page: usize,
    detail: String,
}

impl From<&PushFailure> for StoreError {
    fn from(f: &PushFailure) -> Self {
        StoreError::PushFailed {
            page: f.page,
            detail: f.detail.clone(),
        }
    }
}

struct Worker<S> {
    store: S,
    rx: Receiver<Request>,
    latched: Option<PushFailure>,
}

impl<S: PageStore> Worker<S> {
    fn run(mut self) -> S {
        while let Ok(req) = self.rx.recv() {
            match req {
                Request::Push { page, values } => {
                    if let Err(e) = self.store.push_page(page, &values) {
                        warn!(page, error = %e, "background push failed");
                        if self.latched.is_none() {
                            self.latched = Some(PushFailure {
                                page,
                                detail: e.to_string(),
                            });
                        }
                    }
                }
                Request::Pull { page, reply } => {
                    let result = self.checked(|s| s.pull_page(page));
                    let _ = reply.send(result);
                }
                Request::Open(reply) => {
                    let result = self.checked(|s| s.open());
                    let _ = reply.send(result);
                }
                Request::Close(reply) => {
                    let result = self.checked(|s| s.close());
                    let _ = reply.send(result);
                }
                Request::Clear(reply) => {
                    let result = self.store.clear();
                    if result.is_ok() {
                        self.latched = None;
                    }
                    let _ = reply.send(result);
                }
                Request::Sync(reply) => {
                    let result = self.checked(|s| s.sync());
                    let _ = reply.send(result);
                }
                Request::Shutdown => break,
            }
        }
        debug!("page store worker exiting");
        self.store
    }

    fn checked<T>(
        &mut self,
        op: impl FnOnce(&mut S) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        match &self.latched {
            Some(failure) => Err(failure.into()),
            None => op(&mut self.store),
        }
    }
}

/// A [`PageStore`] that forwards every call to a worker thread.
///
/// Dropping the store shuts the worker down and joins it. Use
/// [`into_inner`](Self::into_inner) to recover the wrapped store.
pub struct BackgroundStore<S: PageStore + 'static> {
    tx: Option<Sender<Request>>,
    handle: Option<JoinHandle<S>>,
}

impl<S: PageStore + 'static> BackgroundStore<S> {
    /// Move `store` onto a new worker thread.
    pub fn spawn(store: S) -> Result<Self, StoreError> {
        Self::with_queue_depth(store, DEFAULT_QUEUE_DEPTH)
    }

    /// Like [`spawn`](Self::spawn) with an explicit request queue depth
    /// (at least 1).
    pub fn with_queue_depth(store: S, depth: usize) -> Result<Self, StoreError> {
        let (tx, rx) = bounded(depth.max(1));
        let worker = Worker {
            store,
            rx,
            latched: None,
        };
        let handle = thread::Builder::new()
            .name(WORKER_NAME.into())
            .spawn(move || worker.run())?;
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    /// Stop the worker and hand back the wrapped store. Queued pushes
    /// are applied first.
    pub fn into_inner(mut self) -> Result<S, StoreError> {
        self.shutdown().ok_or(StoreError::WorkerGone)
    }

    fn send(&self, req: Request) -> Result<(), StoreError> {
        self.tx
            .as_ref()
            .ok_or(StoreError::WorkerGone)?
            .send(req)
            .map_err(|_| StoreError::WorkerGone)
    }

    fn call<T>(&mut self, make: impl FnOnce(Reply<T>) -> Request) -> Result<T, StoreError> {
        let (reply_tx, reply_rx) = bounded(1);
        self.send(make(reply_tx))?;
        reply_rx.recv().map_err(|_| StoreError::WorkerGone)?
    }

    fn shutdown(&mut self) -> Option<S> {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Request::Shutdown);
        }
        self.handle.take().and_then(|h| h.join().ok())
    }
}

impl<S: PageStore + 'static> PageStore for BackgroundStore<S> {
    fn open(&mut self) -> Result<(), StoreError> {
        self.call(Request::Open)
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.call(Request::Close)
    }

    fn push_page(&mut self, page: usize, values: &[f64]) -> Result<(), StoreError> {
        self.send(Request::Push {
            page,
            values: values.to_vec(),
        })
    }

    fn pull_page(&mut self, page: usize) -> Result<Vec<f64>, StoreError> {
        self.call(|reply| Request::Pull { page, reply })
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.call(Request::Clear)
    }

    /// Wait until every queued push has been applied, surfacing any
    /// latched push failure.
    fn sync(&mut self) -> Result<(), StoreError> {
        self.call(Request::Sync)
    }
}

impl<S: PageStore + 'static> Drop for BackgroundStore<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<S: PageStore + 'static> std::fmt::Debug for BackgroundStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundStore")
            .field("running", &self.handle.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::PagedSeries;
    use crate::store::MemoryStore;

    #[test]
    fn worker_thread_is_named() {
        struct NameRecorder(Option<String>);
        impl PageStore for NameRecorder {
            fn push_page(&mut self, _: usize, _: &[f64]) -> Result<(), StoreError> {
                Ok(())
            }
            fn pull_page(&mut self, _: usize) -> Result<Vec<f64>, StoreError> {
                self.0 = thread::current().name().map(str::to_string);
                Ok(Vec::new())
            }
            fn clear(&mut self) -> Result<(), StoreError> {
                Ok(())
            }
        }
        let mut store = BackgroundStore::spawn(NameRecorder(None)).unwrap();
        store.pull_page(0).unwrap();
        let inner = store.into_inner().unwrap();
        assert_eq!(inner.0.as_deref(), Some(WORKER_NAME));
    }

    #[test]
    fn pushes_are_visible_to_later_pulls() {
        let mut store = BackgroundStore::with_queue_depth(MemoryStore::new(), 1).unwrap();
        store.open().unwrap();
        for page in 0..8 {
            store.push_page(page, &[page as f64; 3]).unwrap();
        }
        assert_eq!(store.pull_page(5).unwrap(), vec![5.0; 3]);
        store.sync().unwrap();
        let inner = store.into_inner().unwrap();
        assert_eq!(inner.page_count(), 8);
    }

    #[test]
    fn series_over_background_store() {
        let store = BackgroundStore::spawn(MemoryStore::new()).unwrap();
        let mut series = PagedSeries::new(store, 3).unwrap();
        for i in 0..20 {
            series.append(f64::from(i)).unwrap();
        }
        for i in (0..20u64).rev() {
            assert_eq!(series.get(i).unwrap(), i as f64);
        }
        let inner = series.close().unwrap().into_inner().unwrap();
        assert_eq!(inner.page_count(), 7);
    }

    struct RejectPushes;

    impl PageStore for RejectPushes {
        fn push_page(&mut self, page: usize, _: &[f64]) -> Result<(), StoreError> {
            Err(StoreError::Corrupt {
                page,
                detail: "read-only".into(),
            })
        }
        fn pull_page(&mut self, _: usize) -> Result<Vec<f64>, StoreError> {
            Ok(Vec::new())
        }
        fn clear(&mut self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn failed_push_surfaces_until_cleared() {
        let mut store = BackgroundStore::spawn(RejectPushes).unwrap();
        store.push_page(2, &[1.0]).unwrap();
        for _ in 0..2 {
            match store.pull_page(0) {
                Err(StoreError::PushFailed { page: 2, detail }) => {
                    assert!(detail.contains("read-only"), "{detail}");
                }
                other => panic!("expected PushFailed, got {other:?}"),
            }
        }
        match store.sync() {
            Err(StoreError::PushFailed { page: 2, .. }) => {}
            other => panic!("expected PushFailed, got {other:?}"),
        }
        // The first failure is the one kept.
        store.push_page(5, &[1.0]).unwrap();
        match store.close() {
            Err(StoreError::PushFailed { page: 2, .. }) => {}
            other => panic!("expected PushFailed, got {other:?}"),
        }

        store.clear().unwrap();
        assert!(store.pull_page(0).unwrap().is_empty());
        store.sync().unwrap();
    }
}
