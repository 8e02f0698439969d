//! Ballistic deposition.
//!
//! A particle falls down a random column `c` and sticks at the height of
//! the tallest column among `c-1, c, c+1`. If that cell in column `c` is
//! already taken the particle rests one row above it.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use surfdep_core::Site;
use surfdep_lattice::{LatticeError, PlacementRule, RollingLattice};

/// Seeded ballistic deposition rule.
#[derive(Clone, Debug)]
pub struct BallisticDeposition {
    rng: ChaCha8Rng,
}

impl BallisticDeposition {
    /// Rule drawing columns from a ChaCha8 stream seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Landing site for a particle dropped down column `c`.
    pub fn landing_site(lattice: &RollingLattice, c: usize) -> Result<Site, LatticeError> {
        let ci = c as i64;
        let h = lattice.local_max_height(ci - 1, ci + 1);
        if lattice.is_occupied(c, h)? && lattice.in_bounds(ci, h + 1) {
            Ok(Site::new(c, h + 1))
        } else {
            Ok(Site::new(c, h))
        }
    }
}

impl PlacementRule for BallisticDeposition {
    fn name(&self) -> &str {
        "ballistic"
    }

    fn deposit(&mut self, lattice: &RollingLattice) -> Result<Site, LatticeError> {
        let c = self.rng.random_range(0..lattice.width());
        Self::landing_site(lattice, c)
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(lattice: &mut RollingLattice, site: Site) {
        lattice.occupy(site.x, site.y).unwrap();
        lattice.set_height(site.x, site.y).unwrap();
    }

    #[test]
    fn first_particle_lands_on_the_substrate() {
        let lattice = RollingLattice::new(4, 64, 8).unwrap();
        assert_eq!(
            BallisticDeposition::landing_site(&lattice, 2).unwrap(),
            Site::new(2, 0)
        );
    }

    #[test]
    fn occupied_top_stacks_one_higher() {
        let mut lattice = RollingLattice::new(4, 64, 8).unwrap();
        place(&mut lattice, Site::new(1, 0));
        assert_eq!(
            BallisticDeposition::landing_site(&lattice, 1).unwrap(),
            Site::new(1, 1)
        );
    }

    #[test]
    fn tall_neighbour_makes_an_overhang() {
        let mut lattice = RollingLattice::new(4, 64, 8).unwrap();
        for y in 0..4 {
            place(&mut lattice, Site::new(2, y));
        }
        // Column 1 is empty but sticks beside the top of column 2.
        assert_eq!(
            BallisticDeposition::landing_site(&lattice, 1).unwrap(),
            Site::new(1, 3)
        );
        // Column 0 only sees column 1.
        assert_eq!(
            BallisticDeposition::landing_site(&lattice, 0).unwrap(),
            Site::new(0, 0)
        );
    }

    #[test]
    fn stays_put_at_the_height_limit() {
        let mut lattice = RollingLattice::new(2, 4, 4).unwrap();
        for y in 0..4 {
            place(&mut lattice, Site::new(0, y));
        }
        assert_eq!(
            BallisticDeposition::landing_site(&lattice, 0).unwrap(),
            Site::new(0, 3)
        );
    }

    #[test]
    fn same_seed_same_columns() {
        let lattice = RollingLattice::new(64, 64, 8).unwrap();
        let mut a = BallisticDeposition::new(7);
        let mut b = BallisticDeposition::new(7);
        let xs: Vec<_> = (0..32).map(|_| a.deposit(&lattice).unwrap().x).collect();
        let ys: Vec<_> = (0..32).map(|_| b.deposit(&lattice).unwrap().x).collect();
        assert_eq!(xs, ys);
        a.reseed(7);
        assert_eq!(a.deposit(&lattice).unwrap().x, xs[0]);
        assert!(xs.iter().all(|&x| x < 64));
    }
}
