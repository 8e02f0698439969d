//! Deterministic placement rules.
//!
//! - [`ColumnCycleRule`] stacks one particle on each column in turn.
//! - [`ScriptedRule`] replays a fixed list of landing sites.

use surfdep_core::Site;
use surfdep_lattice::{LatticeError, PlacementRule, RollingLattice};

/// Deposits on column `n mod L` at step `n`, landing one row above the
/// column's current height.
///
/// After `k * L` steps from a flat surface every column has height `k`,
/// so the lattice state is known exactly.
#[derive(Debug, Default)]
pub struct ColumnCycleRule {
    next: u64,
    pub reseeds: Vec<u64>,
}

impl ColumnCycleRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of particles placed so far.
    pub fn placed(&self) -> u64 {
        self.next
    }
}

impl PlacementRule for ColumnCycleRule {
    fn name(&self) -> &str {
        "column-cycle"
    }

    fn deposit(&mut self, lattice: &RollingLattice) -> Result<Site, LatticeError> {
        let x = (self.next % lattice.width() as u64) as usize;
        self.next += 1;
        Ok(Site::new(x, lattice.height(x)? + 1))
    }

    fn reseed(&mut self, seed: u64) {
        self.next = 0;
        self.reseeds.push(seed);
    }
}

/// Returns the scripted sites in order, wrapping around at the end.
#[derive(Debug)]
pub struct ScriptedRule {
    sites: Vec<Site>,
    cursor: usize,
}

impl ScriptedRule {
    /// # Panics
    ///
    /// If `sites` is empty.
    pub fn new(sites: Vec<Site>) -> Self {
        assert!(!sites.is_empty(), "ScriptedRule needs at least one site");
        Self { sites, cursor: 0 }
    }

    /// Script from `(x, y)` pairs.
    pub fn from_pairs(pairs: &[(usize, i64)]) -> Self {
        Self::new(pairs.iter().map(|&(x, y)| Site::new(x, y)).collect())
    }
}

impl PlacementRule for ScriptedRule {
    fn name(&self) -> &str {
        "scripted"
    }

    fn deposit(&mut self, _lattice: &RollingLattice) -> Result<Site, LatticeError> {
        let site = self.sites[self.cursor % self.sites.len()];
        self.cursor += 1;
        Ok(site)
    }

    fn reseed(&mut self, _seed: u64) {
        self.cursor = 0;
    }
}
