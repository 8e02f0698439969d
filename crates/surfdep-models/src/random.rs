//! Random deposition over a list of growth sites.
//!
//! The rule keeps every empty cell next to the cluster as a candidate.
//! Each deposit fills one candidate chosen uniformly at random, and the
//! empty cells around it become candidates in turn. A cell may be listed
//! more than once, and a listed cell may fill before it is drawn; drawing
//! it again deposits nothing new.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use surfdep_core::Site;
use surfdep_lattice::{LatticeError, PlacementRule, RollingLattice};

/// Seeded growth-site deposition rule.
///
/// The candidate list starts as the substrate row `(x, 0)` for every
/// column, built on the first deposit of a run. The neighbours of a
/// filled site are listed on the following deposit, once the engine has
/// occupied it.
///
/// Growth spreads sideways and downwards as well as up. A site whose
/// rows were recycled under it has no occupied neighbour left and is
/// discarded when drawn.
#[derive(Clone, Debug)]
pub struct RandomDeposition {
    rng: ChaCha8Rng,
    sites: Vec<Site>,
    primed: bool,
    last: Option<Site>,
}

impl RandomDeposition {
    /// Rule drawing sites from a ChaCha8 stream seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            sites: Vec::new(),
            primed: false,
            last: None,
        }
    }

    /// Candidates waiting to be drawn, duplicates included. Excludes the
    /// neighbours of the last deposit, which are listed on the next one.
    pub fn growth_sites(&self) -> &[Site] {
        &self.sites
    }

    fn list_neighbours(&mut self, lattice: &RollingLattice, site: Site) -> Result<(), LatticeError> {
        let (cx, cy) = (site.x as i64, site.y);
        for dx in -1..=1 {
            for dy in -1..=1 {
                let (x, y) = (cx + dx, cy + dy);
                if lattice.in_bounds(x, y) && !lattice.is_occupied(x as usize, y)? {
                    self.sites.push(Site::new(x as usize, y));
                }
            }
        }
        Ok(())
    }
}

impl PlacementRule for RandomDeposition {
    fn name(&self) -> &str {
        "random"
    }

    fn deposit(&mut self, lattice: &RollingLattice) -> Result<Site, LatticeError> {
        if !self.primed {
            self.sites = (0..lattice.width()).map(|x| Site::new(x, 0)).collect();
            self.primed = true;
        }
        if let Some(last) = self.last.take() {
            self.list_neighbours(lattice, last)?;
        }
        while !self.sites.is_empty() {
            let pick = self.rng.random_range(0..self.sites.len());
            let site = self.sites.swap_remove(pick);
            if site.y > 0 && !lattice.has_neighbours(site.x as i64, site.y) {
                continue;
            }
            self.last = Some(site);
            return Ok(site);
        }
        Err(LatticeError::NoGrowthSite)
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.sites.clear();
        self.primed = false;
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn place(lattice: &mut RollingLattice, site: Site) {
        lattice.occupy(site.x, site.y).unwrap();
        if site.y > lattice.height(site.x).unwrap() {
            lattice.set_height(site.x, site.y).unwrap();
        }
    }

    #[test]
    fn first_deposit_lands_on_the_substrate() {
        let lattice = RollingLattice::new(6, 64, 64).unwrap();
        let mut rule = RandomDeposition::new(3);
        let site = rule.deposit(&lattice).unwrap();
        assert_eq!(site.y, 0);
        assert_eq!(rule.growth_sites().len(), 5);
        assert!(!rule.growth_sites().contains(&site));
    }

    #[test]
    fn empty_neighbours_of_a_fill_are_listed() {
        let mut lattice = RollingLattice::new(1, 4, 4).unwrap();
        let mut rule = RandomDeposition::new(0);
        let first = rule.deposit(&lattice).unwrap();
        assert_eq!(first, Site::new(0, 0));
        place(&mut lattice, first);
        // One column: only (0, 1) is an empty in-bounds neighbour.
        assert_eq!(rule.deposit(&lattice).unwrap(), Site::new(0, 1));
        place(&mut lattice, Site::new(0, 1));
        assert_eq!(rule.deposit(&lattice).unwrap(), Site::new(0, 2));
        place(&mut lattice, Site::new(0, 2));
        assert_eq!(rule.deposit(&lattice).unwrap(), Site::new(0, 3));
        place(&mut lattice, Site::new(0, 3));
        // Row H is out of bounds: the column is full.
        match rule.deposit(&lattice) {
            Err(LatticeError::NoGrowthSite) => {}
            other => panic!("expected NoGrowthSite, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_sites_are_discarded() {
        let mut lattice = RollingLattice::new(3, 64, 8).unwrap();
        let mut rule = RandomDeposition::new(9);
        let first = rule.deposit(&lattice).unwrap();
        assert_eq!(first.y, 0);
        place(&mut lattice, first);
        rule.deposit(&lattice).unwrap();
        // Recycling the bottom half takes the cluster from under every
        // listed site above the substrate.
        lattice.recycle(0).unwrap();
        assert_eq!(lattice.occupied_cells(), 0);
        for _ in 0..20 {
            match rule.deposit(&lattice) {
                Ok(site) => assert_eq!(site.y, 0),
                Err(LatticeError::NoGrowthSite) => break,
                Err(e) => panic!("unexpected {e}"),
            }
        }
    }

    #[test]
    fn reseed_restarts_from_the_substrate() {
        let mut lattice = RollingLattice::new(4, 64, 64).unwrap();
        let mut rule = RandomDeposition::new(1);
        for _ in 0..10 {
            let site = rule.deposit(&lattice).unwrap();
            place(&mut lattice, site);
        }
        rule.reseed(1);
        let fresh = RollingLattice::new(4, 64, 64).unwrap();
        let mut twin = RandomDeposition::new(1);
        assert_eq!(rule.deposit(&fresh).unwrap(), twin.deposit(&fresh).unwrap());
        assert_eq!(rule.growth_sites(), twin.growth_sites());
    }

    proptest! {
        #[test]
        fn every_deposit_touches_the_cluster(seed in any::<u64>(), steps in 1usize..300) {
            let mut lattice = RollingLattice::new(8, 256, 256).unwrap();
            let mut rule = RandomDeposition::new(seed);
            for _ in 0..steps {
                let site = rule.deposit(&lattice).unwrap();
                prop_assert!(lattice.in_bounds(site.x as i64, site.y));
                prop_assert!(
                    site.y == 0 || lattice.has_neighbours(site.x as i64, site.y),
                    "{} is detached", site
                );
                place(&mut lattice, site);
            }
            // Heights track the highest filled row of each column.
            for x in 0..8 {
                let h = lattice.height(x).unwrap();
                if h > 0 {
                    prop_assert!(lattice.is_occupied(x, h).unwrap());
                }
                prop_assert!(!lattice.is_occupied(x, h + 1).unwrap());
            }
        }
    }
}
