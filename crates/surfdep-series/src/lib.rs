//! Logically unbounded, append-only `f64` sequences backed by pages.
//!
//! [`PagedSeries`] keeps exactly one fixed-size page resident in memory
//! and moves pages to and from a [`PageStore`] when an access crosses a
//! page boundary. Stores are pluggable: [`MemoryStore`] for tests and
//! small runs, [`FileStore`] for on-disk paging, and [`BackgroundStore`]
//! to run any store on a dedicated I/O thread.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod background;
pub mod error;
pub mod file;
pub mod series;
pub mod store;

pub use background::BackgroundStore;
pub use error::{SeriesError, StoreError};
pub use file::FileStore;
pub use series::{PagedSeries, PagingObserver, PagingOp, PagingStats, MAX_PAGE_LEN};
pub use store::{MemoryStore, PageStore};
