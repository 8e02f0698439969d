//! The deposition engine and the machinery around it.
//!
//! [`DepositionEngine`] drives one simulation run: each
//! [`step()`](DepositionEngine::step) asks a pluggable
//! [`PlacementRule`](surfdep_lattice::PlacementRule) for a landing site,
//! updates the [`RollingLattice`](surfdep_lattice::RollingLattice),
//! rescans the column heights, and records the surface width into a
//! [`PagedSeries`](surfdep_series::PagedSeries) when the configured
//! [`TimeScale`] says so.
//!
//! Runs are configured from a string-keyed
//! [`ParamMap`](surfdep_core::ParamMap) through [`EngineConfig`],
//! stopped by the host via [`HeightGuard`], and batched into trial
//! cohorts by [`run_trials`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod guard;
pub mod metrics;
pub mod policy;
pub mod surface;
pub mod trial;

pub use config::{ConfigError, EngineConfig};
pub use engine::{DepositionEngine, EngineState, RunStop, StepError, StepOutcome};
pub use guard::{HeightGuard, StopReason};
pub use metrics::RunMetrics;
pub use policy::{TimeScale, TimeScalePolicy};
pub use surface::{surface_width, SurfaceStats};
pub use trial::{
    run_trials, AnalysisWindow, TrialContext, TrialError, TrialPlan, TrialReport, MAX_SEED,
};
