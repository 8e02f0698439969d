//! Reference deposition models.
//!
//! Each model is a [`PlacementRule`](surfdep_lattice::PlacementRule)
//! driven by a seeded ChaCha8 RNG, so identical seeds replay identical
//! deposits.
//!
//! - [`BallisticDeposition`]: particles stick to the first occupied
//!   neighbour they meet, producing overhangs and KPZ-class growth.
//! - [`RandomDeposition`]: a uniformly chosen empty cell next to the
//!   cluster fills each step, so growth spreads in every direction.
//! - [`ColumnDeposition`]: particles stack straight onto a random
//!   column with no lateral correlation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod ballistic;
pub mod column;
pub mod random;

pub use ballistic::BallisticDeposition;
pub use column::ColumnDeposition;
pub use random::RandomDeposition;

use surfdep_core::{keys, ParamError, ParamMap};

/// Read the RNG seed from `params`, defaulting to 0.
pub fn seed_from_params(params: &ParamMap) -> Result<u64, ParamError> {
    Ok(params.get_u64(keys::SEED)?.unwrap_or(0))
}
