//! Rolling occupancy lattice and the placement-rule extension point.
//!
//! [`RollingLattice`] stores only a `dH`-row window of an `L x H`
//! deposit, addressing logical row `y` at physical row `y mod dH` and
//! recycling one half of the window at a time as the growth front
//! advances. [`PlacementRule`] is the seam where deposition models plug
//! in: given read access to the lattice, a rule picks the next site.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod lattice;
pub mod rule;

pub use error::LatticeError;
pub use lattice::{Half, RollingLattice};
pub use rule::{rule_fn, FnRule, PlacementRule};
pub use surfdep_core::Site;
