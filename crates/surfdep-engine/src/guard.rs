//! Host-side stop condition for runs approaching the height limit.
//!
//! The engine never halts itself. A host loop polls a [`HeightGuard`]
//! before each step and stops the run when it trips.

use std::fmt;

use surfdep_lattice::PlacementRule;
use surfdep_series::PageStore;

use crate::config::EngineConfig;
use crate::engine::DepositionEngine;
use crate::surface::SurfaceStats;

/// Why a [`HeightGuard`] tripped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StopReason {
    /// The average height passed `margin * H`.
    AverageHeight {
        /// Average height at the time.
        average_height: f64,
        /// The threshold it exceeded.
        threshold: f64,
    },
    /// A column reached the top logical row `H - 1`.
    Capacity {
        /// The tallest column.
        max_height: i64,
    },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AverageHeight {
                average_height,
                threshold,
            } => write!(f, "average height {average_height:.2} exceeds {threshold:.2}"),
            Self::Capacity { max_height } => {
                write!(f, "column height {max_height} reached the lattice top")
            }
        }
    }
}

/// Stops a run when the surface nears the logical height `H`.
///
/// Two conditions, checked in order: the average height exceeds
/// `margin * H`, or the tallest column has reached `H - 1`, past which a
/// placement could land outside `[0, H)`. The margin is a tunable safety
/// band; the capacity check is the hard limit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightGuard {
    /// Fraction of `H` the average height may reach. Default 0.9.
    pub margin: f64,
}

impl Default for HeightGuard {
    fn default() -> Self {
        Self { margin: 0.9 }
    }
}

impl HeightGuard {
    /// Guard with a custom margin.
    pub fn with_margin(margin: f64) -> Self {
        Self { margin }
    }

    /// Check the engine's current surface. `None` outside a run.
    pub fn should_stop<R: PlacementRule, S: PageStore>(
        &self,
        engine: &DepositionEngine<R, S>,
    ) -> Option<StopReason> {
        let max_height = engine.config().map(EngineConfig::max_height_i64)?;
        self.check(&engine.stats(), max_height)
    }

    /// Check `stats` against logical height `max_height`.
    pub fn check(&self, stats: &SurfaceStats, max_height: i64) -> Option<StopReason> {
        let threshold = self.margin * max_height as f64;
        if stats.average_height > threshold {
            return Some(StopReason::AverageHeight {
                average_height: stats.average_height,
                threshold,
            });
        }
        if stats.max_height >= max_height - 1 {
            return Some(StopReason::Capacity {
                max_height: stats.max_height,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(avg: f64, max: i64) -> SurfaceStats {
        SurfaceStats {
            average_height: avg,
            min_height: 0,
            max_height: max,
        }
    }

    #[test]
    fn margin_trips_on_average() {
        let guard = HeightGuard::default();
        assert_eq!(guard.check(&stats(90.0, 95), 100), None);
        assert!(matches!(
            guard.check(&stats(90.5, 95), 100),
            Some(StopReason::AverageHeight { .. })
        ));
    }

    #[test]
    fn capacity_trips_on_tallest_column() {
        let guard = HeightGuard::with_margin(1.0);
        assert_eq!(
            guard.check(&stats(10.0, 99), 100),
            Some(StopReason::Capacity { max_height: 99 })
        );
        assert_eq!(guard.check(&stats(10.0, 98), 100), None);
    }

    #[test]
    fn idle_engine_never_trips() {
        let rule = surfdep_lattice::rule_fn("idle", |_: &surfdep_lattice::RollingLattice| {
            Ok(surfdep_core::Site::new(0, 0))
        });
        let engine = DepositionEngine::new(rule, surfdep_series::MemoryStore::new()).unwrap();
        assert_eq!(HeightGuard::with_margin(0.0).should_stop(&engine), None);
    }
}
