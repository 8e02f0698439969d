//! Test fixtures for surfdep development.
//!
//! Deterministic placement rules for driving an engine to a known
//! lattice state, and instrumented page stores for observing or breaking
//! paging.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod rules;
pub mod stores;

pub use rules::{ColumnCycleRule, ScriptedRule};
pub use stores::{FailingStore, RecordingStore, StoreEvent};
