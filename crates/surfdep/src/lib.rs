//! surfdep: surface-growth deposition simulations.
//!
//! This is the facade crate that re-exports the public API of every
//! surfdep sub-crate. Depending on `surfdep` alone is enough for most
//! hosts.
//!
//! # Quick start
//!
//! ```rust
//! use surfdep::prelude::*;
//!
//! let mut engine = DepositionEngine::new(BallisticDeposition::new(0), MemoryStore::new()).unwrap();
//! let params = ParamMap::new()
//!     .with(keys::LENGTH, 32.0)
//!     .with(keys::HEIGHT, 256.0)
//!     .with(keys::BUFFER_HEIGHT, 32.0)
//!     .with(keys::SEED, 42.0);
//! engine.init(&params).unwrap();
//!
//! let stop = engine.run_until_stopped(&HeightGuard::default(), Some(500)).unwrap();
//! assert_eq!(stop, RunStop::StepLimit);
//! assert_eq!(engine.series().len(), 500);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `surfdep-core` | Sites, model ids, parameter maps |
//! | [`lattice`] | `surfdep-lattice` | Rolling lattice and the placement-rule trait |
//! | [`series`] | `surfdep-series` | Paged width series and page stores |
//! | [`models`] | `surfdep-models` | Ballistic and random deposition |
//! | [`analysis`] | `surfdep-analysis` | Regression, β/α scaling, ensemble averages |
//! | [`engine`] | `surfdep-engine` | Engine, time scales, height guard, trials |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Shared value types and parameter maps (`surfdep-core`).
pub use surfdep_core as types;

/// Bit-packed rolling lattice (`surfdep-lattice`).
///
/// Implement [`lattice::PlacementRule`] to plug a new growth model into
/// the engine.
pub use surfdep_lattice as lattice;

/// Paged width series (`surfdep-series`).
///
/// [`series::MemoryStore`] keeps pages in process memory,
/// [`series::FileStore`] on disk, and [`series::BackgroundStore`] moves
/// any store's I/O onto a worker thread.
pub use surfdep_series as series;

/// Reference growth models (`surfdep-models`).
pub use surfdep_models as models;

/// Scaling analysis (`surfdep-analysis`).
pub use surfdep_analysis as analysis;

/// The deposition engine and trial orchestration (`surfdep-engine`).
pub use surfdep_engine as engine;

/// Common imports for typical surfdep usage.
///
/// ```rust
/// use surfdep::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use surfdep_core::{keys, ModelId, ParamError, ParamMap, Site};

    // Lattice
    pub use surfdep_lattice::{rule_fn, LatticeError, PlacementRule, RollingLattice};

    // Series
    pub use surfdep_series::{
        BackgroundStore, FileStore, MemoryStore, PageStore, PagedSeries, SeriesError,
    };

    // Models
    pub use surfdep_models::{BallisticDeposition, ColumnDeposition, RandomDeposition};

    // Analysis
    pub use surfdep_analysis::{EnsembleAverages, Regression, SizePoint, StatsRecord};

    // Engine
    pub use surfdep_engine::{
        run_trials, AnalysisWindow, ConfigError, DepositionEngine, EngineConfig, EngineState,
        HeightGuard, RunStop, StepError, StepOutcome, TimeScale, TrialContext, TrialPlan,
        TrialReport,
    };
}
