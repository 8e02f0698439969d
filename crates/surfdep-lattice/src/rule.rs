//! The placement-rule trait: where does the next particle land?

use surfdep_core::Site;

use crate::error::LatticeError;
use crate::lattice::RollingLattice;

/// A deposition model's choice of landing site.
///
/// The engine calls [`deposit`](Self::deposit) once per step with
/// read-only access to the lattice. The rule may query occupancy,
/// column heights and [`RollingLattice::local_max_height`], and returns
/// the site where the particle comes to rest. The engine, not the rule,
/// mutates the lattice.
///
/// Rules must never read rows in a half that has already been
/// recycled: such rows read as unoccupied.
pub trait PlacementRule: Send {
    /// Human-readable name used in logs and errors.
    fn name(&self) -> &str;

    /// Choose the landing site for the next particle.
    fn deposit(&mut self, lattice: &RollingLattice) -> Result<Site, LatticeError>;

    /// Reset any internal randomness. Called on every engine `init`.
    fn reseed(&mut self, _seed: u64) {}
}

impl<R: PlacementRule + ?Sized> PlacementRule for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn deposit(&mut self, lattice: &RollingLattice) -> Result<Site, LatticeError> {
        (**self).deposit(lattice)
    }

    fn reseed(&mut self, seed: u64) {
        (**self).reseed(seed)
    }
}

/// A [`PlacementRule`] backed by a closure. Built with [`rule_fn`].
pub struct FnRule<F> {
    name: String,
    f: F,
}

/// Wrap a closure as a named placement rule.
///
/// ```
/// use surfdep_lattice::{rule_fn, PlacementRule, RollingLattice, Site};
///
/// // Always stack on column 0.
/// let mut rule = rule_fn("pile", |l: &RollingLattice| Ok(Site::new(0, l.height(0)? + 1)));
/// let lattice = RollingLattice::new(4, 64, 8).unwrap();
/// assert_eq!(rule.deposit(&lattice).unwrap(), Site::new(0, 1));
/// assert_eq!(rule.name(), "pile");
/// ```
pub fn rule_fn<F>(name: impl Into<String>, f: F) -> FnRule<F>
where
    F: FnMut(&RollingLattice) -> Result<Site, LatticeError> + Send,
{
    FnRule {
        name: name.into(),
        f,
    }
}

impl<F> PlacementRule for FnRule<F>
where
    F: FnMut(&RollingLattice) -> Result<Site, LatticeError> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn deposit(&mut self, lattice: &RollingLattice) -> Result<Site, LatticeError> {
        (self.f)(lattice)
    }
}

impl<F> std::fmt::Debug for FnRule<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnRule").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boxed_rules_delegate() {
        let mut calls = 0u32;
        let rule = rule_fn("count", move |_: &RollingLattice| {
            calls += 1;
            Ok(Site::new(0, i64::from(calls)))
        });
        let mut boxed: Box<dyn PlacementRule> = Box::new(rule);
        let lattice = RollingLattice::new(2, 16, 4).unwrap();
        assert_eq!(boxed.name(), "count");
        assert_eq!(boxed.deposit(&lattice).unwrap(), Site::new(0, 1));
        assert_eq!(boxed.deposit(&lattice).unwrap(), Site::new(0, 2));
    }

    #[test]
    fn rule_errors_propagate() {
        let mut rule = rule_fn("bad", |l: &RollingLattice| {
            l.is_occupied(99, 0)?;
            Ok(Site::new(0, 0))
        });
        let lattice = RollingLattice::new(2, 16, 4).unwrap();
        assert!(matches!(
            rule.deposit(&lattice),
            Err(LatticeError::OutOfRange { x: 99, .. })
        ));
    }
}
