//! Column deposition: independent columns.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use surfdep_core::Site;
use surfdep_lattice::{LatticeError, PlacementRule, RollingLattice};

/// Drops each particle straight onto a uniformly chosen column.
///
/// The width grows as `t^(1/2)` and never saturates, which makes this a
/// handy reference for the β estimator.
#[derive(Clone, Debug)]
pub struct ColumnDeposition {
    rng: ChaCha8Rng,
}

impl ColumnDeposition {
    /// Rule seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl PlacementRule for ColumnDeposition {
    fn name(&self) -> &str {
        "column"
    }

    fn deposit(&mut self, lattice: &RollingLattice) -> Result<Site, LatticeError> {
        let c = self.rng.random_range(0..lattice.width());
        let h = lattice.height(c)?;
        if lattice.is_occupied(c, h)? {
            Ok(Site::new(c, h + 1))
        } else {
            Ok(Site::new(c, h))
        }
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn columns_grow_by_exactly_one(seed in any::<u64>(), steps in 1usize..200) {
            let mut lattice = RollingLattice::new(8, 1024, 512).unwrap();
            let mut rule = ColumnDeposition::new(seed);
            let mut count = [0i64; 8];
            for _ in 0..steps {
                let site = rule.deposit(&lattice).unwrap();
                count[site.x] += 1;
                lattice.occupy(site.x, site.y).unwrap();
                lattice.set_height(site.x, site.y).unwrap();
            }
            for (x, &n) in count.iter().enumerate() {
                // n particles on a fresh column top out at row n - 1.
                let expected = if n == 0 { 0 } else { n - 1 };
                prop_assert_eq!(lattice.height(x).unwrap(), expected);
            }
        }
    }
}
