//! Integration test: a front climbing through many buffer generations.
//!
//! A single column grown one row per step must always keep the most
//! recent `dH/2` rows occupied, however many times the buffer has
//! wrapped, and recycling must never touch the other columns' state.

use proptest::prelude::*;
use surfdep_lattice::{Half, RollingLattice};

fn climb(lattice: &mut RollingLattice, x: usize, to: i64) -> (u64, u64) {
    let (mut bottom, mut top) = (0, 0);
    for y in 0..=to {
        match lattice.recycle(y).unwrap() {
            Some(Half::Bottom) => bottom += 1,
            Some(Half::Top) => top += 1,
            None => {}
        }
        lattice.occupy(x, y).unwrap();
        lattice.set_height(x, y).unwrap();
    }
    (bottom, top)
}

#[test]
fn halves_alternate_as_the_front_climbs() {
    let mut lattice = RollingLattice::new(3, 1_000, 8).unwrap();
    let (bottom, top) = climb(&mut lattice, 1, 99);
    // Bottom at 0, 8, .., 96; top at 4, 12, .., 92.
    assert_eq!(bottom, 13);
    assert_eq!(top, 12);
    assert_eq!(lattice.height(1).unwrap(), 99);
    assert_eq!(lattice.heights(), &[0, 99, 0]);
}

#[test]
fn a_front_that_stalls_on_a_boundary_clears_once() {
    let mut lattice = RollingLattice::new(2, 100, 8).unwrap();
    climb(&mut lattice, 0, 8);
    let before = lattice.occupied_cells();
    assert_eq!(lattice.recycle(8).unwrap(), None);
    assert_eq!(lattice.occupied_cells(), before);
}

proptest! {
    #[test]
    fn recent_rows_survive_recycling(
        width in 1usize..130,
        half in 1usize..32,
        steps in 0i64..600,
        pick in any::<prop::sample::Index>(),
    ) {
        let dh = 2 * half;
        let x = pick.index(width);
        let mut lattice = RollingLattice::new(width, 1_000, dh).unwrap();
        climb(&mut lattice, x, steps);

        let oldest_kept = (steps - half as i64 + 1).max(0);
        for y in oldest_kept..=steps {
            prop_assert!(lattice.is_occupied(x, y).unwrap(), "row {} lost", y);
        }
        // Never more than one buffer's worth of cells is held.
        prop_assert!(lattice.occupied_cells() <= dh as u64);
        for other in (0..width).filter(|&c| c != x) {
            prop_assert_eq!(lattice.height(other).unwrap(), 0);
            prop_assert!(!lattice.is_occupied(other, steps).unwrap());
        }
    }
}
