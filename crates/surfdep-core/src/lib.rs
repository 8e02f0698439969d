//! Core types for the surfdep deposition framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the lattice site type, model identifiers, the string-keyed parameter
//! map shared with the orchestration layer, and its error type.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod params;

pub use error::ParamError;
pub use id::{ModelId, Site};
pub use params::{keys, ParamMap};
