//! The deposition engine state machine.
//!
//! [`DepositionEngine`] owns the lattice, the width series and the
//! time-scale policy of one run, and is generic over the placement rule
//! and the page store. All mutation goes through `&mut self`, so steps
//! never overlap.
//!
//! # Lifecycle
//!
//! `Uninitialized → Initialized → Running → Stopped`. [`init`] may be
//! called from any state and starts a fresh run. [`step`] is valid in
//! `Initialized` and `Running`. [`stop`] and [`clear_memory`] end a run.
//!
//! [`init`]: DepositionEngine::init
//! [`step`]: DepositionEngine::step
//! [`stop`]: DepositionEngine::stop
//! [`clear_memory`]: DepositionEngine::clear_memory

use std::error::Error;
use std::fmt;

use surfdep_core::{ParamMap, Site};
use surfdep_lattice::{Half, LatticeError, PlacementRule, RollingLattice};
use surfdep_series::{PageStore, PagedSeries, SeriesError};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, EngineConfig};
use crate::guard::{HeightGuard, StopReason};
use crate::metrics::RunMetrics;
use crate::policy::TimeScalePolicy;
use crate::surface::{surface_width, SurfaceStats};

// ── StepError ──────────────────────────────────────────────────────

/// Errors from [`DepositionEngine::step`].
#[derive(Debug)]
pub enum StepError {
    /// `init` has not been called, or the run was cleared.
    NotInitialized,
    /// The run was stopped.
    Stopped,
    /// The placement rule chose a site the lattice cannot hold.
    Placement {
        /// Name of the rule.
        rule: String,
        /// What was wrong with the site.
        reason: String,
    },
    /// The placement rule failed while reading the lattice.
    Lattice(LatticeError),
    /// Recording the width failed.
    Series(SeriesError),
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "engine is not initialized"),
            Self::Stopped => write!(f, "run has been stopped"),
            Self::Placement { rule, reason } => {
                write!(f, "placement rule '{rule}' chose an invalid site: {reason}")
            }
            Self::Lattice(e) => write!(f, "lattice: {e}"),
            Self::Series(e) => write!(f, "width series: {e}"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Lattice(e) => Some(e),
            Self::Series(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LatticeError> for StepError {
    fn from(e: LatticeError) -> Self {
        Self::Lattice(e)
    }
}

impl From<SeriesError> for StepError {
    fn from(e: SeriesError) -> Self {
        Self::Series(e)
    }
}

// ── StepOutcome / EngineState / RunStop ────────────────────────────

/// What one step did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepOutcome {
    /// Where the particle landed.
    pub site: Site,
    /// Time of the step, starting at 0.
    pub time: i64,
    /// The width recorded this step, if the policy measured.
    pub width: Option<f64>,
    /// Whether ensemble averages are due this step.
    pub average_due: bool,
    /// The buffer half recycled this step, if any.
    pub recycled: Option<Half>,
}

/// Lifecycle state of a [`DepositionEngine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// No run allocated.
    Uninitialized,
    /// Allocated, no step taken yet.
    Initialized,
    /// At least one step taken.
    Running,
    /// Stopped by the host; results remain readable.
    Stopped,
}

/// Why [`DepositionEngine::run_until_stopped`] returned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RunStop {
    /// The height guard tripped.
    Guard(StopReason),
    /// The step budget ran out.
    StepLimit,
}

// ── DepositionEngine ───────────────────────────────────────────────

/// Drives one deposition run.
///
/// # Example
///
/// ```
/// use surfdep_core::{keys, ParamMap, Site};
/// use surfdep_engine::{DepositionEngine, EngineState};
/// use surfdep_lattice::{rule_fn, RollingLattice};
/// use surfdep_series::MemoryStore;
///
/// let rule = rule_fn("pile-on-0", |l: &RollingLattice| Ok(Site::new(0, l.height(0)? + 1)));
/// let mut engine = DepositionEngine::new(rule, MemoryStore::new()).unwrap();
/// let params = ParamMap::new()
///     .with(keys::LENGTH, 4.0)
///     .with(keys::HEIGHT, 64.0)
///     .with(keys::BUFFER_HEIGHT, 16.0);
/// engine.init(&params).unwrap();
/// let outcome = engine.step().unwrap();
/// assert_eq!(outcome.site, Site::new(0, 1));
/// assert_eq!(engine.state(), EngineState::Running);
/// assert_eq!(engine.series().len(), 1);
/// ```
pub struct DepositionEngine<R: PlacementRule, S: PageStore> {
    rule: R,
    series: PagedSeries<S>,
    config: Option<EngineConfig>,
    lattice: Option<RollingLattice>,
    policy: TimeScalePolicy,
    time: i64,
    stats: SurfaceStats,
    state: EngineState,
    metrics: RunMetrics,
}

impl<R: PlacementRule, S: PageStore> DepositionEngine<R, S> {
    /// Engine placing particles with `rule` and paging widths to `store`.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be opened.
    pub fn new(rule: R, store: S) -> Result<Self, SeriesError> {
        Ok(Self {
            rule,
            series: PagedSeries::new(store, 1)?,
            config: None,
            lattice: None,
            policy: TimeScalePolicy::new(Default::default()),
            time: -1,
            stats: SurfaceStats::default(),
            state: EngineState::Uninitialized,
            metrics: RunMetrics::default(),
        })
    }

    /// Start a fresh run from a parameter map.
    pub fn init(&mut self, params: &ParamMap) -> Result<(), ConfigError> {
        self.init_with(EngineConfig::from_params(params)?)
    }

    /// Start a fresh run from a typed config.
    ///
    /// Validates first; on error the engine is left as it was. Then
    /// allocates the lattice, clears the series, resets the policy and
    /// reseeds the rule. The first [`step`](Self::step) runs at time 0.
    pub fn init_with(&mut self, config: EngineConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let lattice = RollingLattice::new(
            config.length,
            config.max_height_i64(),
            config.buffer_height as usize,
        )?;
        self.series.reset(config.page_len)?;
        self.rule.reseed(config.seed);
        self.policy = TimeScalePolicy::new(config.time_scale);
        self.stats = SurfaceStats::of(lattice.heights());
        self.time = -1;
        self.metrics = RunMetrics::default();
        info!(
            rule = self.rule.name(),
            length = config.length,
            max_height = config.max_height,
            buffer_height = config.buffer_height,
            page_len = config.page_len,
            time_scale = config.time_scale.name(),
            seed = config.seed,
            "engine initialized"
        );
        self.lattice = Some(lattice);
        self.config = Some(config);
        self.state = EngineState::Initialized;
        Ok(())
    }

    /// Deposit one particle.
    ///
    /// The rule's site is checked before anything is mutated, so a
    /// rejected placement leaves the run untouched. Only a failure to
    /// append the width leaves the step partially applied.
    ///
    /// # Errors
    ///
    /// [`StepError::NotInitialized`] / [`StepError::Stopped`] outside a
    /// run; [`StepError::Placement`] if the site lies outside the
    /// lattice columns or below the substrate; the rule's own
    /// [`StepError::Lattice`] errors; [`StepError::Series`] on paging
    /// failure.
    pub fn step(&mut self) -> Result<StepOutcome, StepError> {
        match self.state {
            EngineState::Uninitialized => return Err(StepError::NotInitialized),
            EngineState::Stopped => return Err(StepError::Stopped),
            EngineState::Initialized | EngineState::Running => {}
        }
        let lattice = self.lattice.as_mut().ok_or(StepError::NotInitialized)?;

        let site = self.rule.deposit(lattice)?;
        if site.x >= lattice.width() || site.y < 0 {
            return Err(StepError::Placement {
                rule: self.rule.name().to_string(),
                reason: format!("{site} is outside columns [0, {})", lattice.width()),
            });
        }

        self.policy.on_step(self.time, self.stats.average_height);
        self.time += 1;

        let recycled = lattice.recycle(site.y)?;
        match recycled {
            Some(Half::Bottom) => self.metrics.bottom_recycles += 1,
            Some(Half::Top) => self.metrics.top_recycles += 1,
            None => {}
        }
        if let Some(half) = recycled {
            debug!(?half, y = site.y, time = self.time, "recycled buffer half");
        }
        lattice.occupy(site.x, site.y)?;
        // Rules may fill below a column's top; heights never drop.
        if site.y > lattice.height(site.x)? {
            lattice.set_height(site.x, site.y)?;
        }

        self.stats = SurfaceStats::of(lattice.heights());
        let average_height = self.stats.average_height;

        let width = if self.policy.should_measure(average_height) {
            let w = surface_width(lattice.heights(), average_height);
            self.series.append(w)?;
            self.metrics.measurements += 1;
            Some(w)
        } else {
            None
        };
        let average_due = self.policy.should_average(self.time, average_height);
        if average_due {
            self.metrics.averages_due += 1;
        }

        self.metrics.steps += 1;
        self.state = EngineState::Running;
        Ok(StepOutcome {
            site,
            time: self.time,
            width,
            average_due,
            recycled,
        })
    }

    /// Step until `guard` trips or `max_steps` steps have run, then
    /// [`stop`](Self::stop).
    pub fn run_until_stopped(
        &mut self,
        guard: &HeightGuard,
        max_steps: Option<u64>,
    ) -> Result<RunStop, StepError> {
        self.run_until_stopped_with(guard, max_steps, |_, _| {})
    }

    /// [`run_until_stopped`](Self::run_until_stopped), calling
    /// `on_step` with the engine and outcome after every step.
    pub fn run_until_stopped_with<F>(
        &mut self,
        guard: &HeightGuard,
        max_steps: Option<u64>,
        mut on_step: F,
    ) -> Result<RunStop, StepError>
    where
        F: FnMut(&Self, &StepOutcome),
    {
        if self.config.is_none() {
            return Err(StepError::NotInitialized);
        }
        let mut taken = 0u64;
        let stop = loop {
            if let Some(reason) = guard.should_stop(self) {
                warn!(%reason, time = self.time, "height guard stopped the run");
                break RunStop::Guard(reason);
            }
            if max_steps.is_some_and(|max| taken >= max) {
                break RunStop::StepLimit;
            }
            let outcome = self.step()?;
            on_step(&*self, &outcome);
            taken += 1;
        };
        self.stop()?;
        Ok(stop)
    }

    /// End the run, flushing the width series. Results stay readable.
    pub fn stop(&mut self) -> Result<(), SeriesError> {
        if self.state == EngineState::Uninitialized {
            return Ok(());
        }
        self.series.flush()?;
        if self.state != EngineState::Stopped {
            info!(
                steps = self.metrics.steps,
                measurements = self.metrics.measurements,
                "run stopped"
            );
        }
        self.state = EngineState::Stopped;
        Ok(())
    }

    /// Release the lattice and every recorded width.
    pub fn clear_memory(&mut self) -> Result<(), SeriesError> {
        self.series.clear()?;
        self.lattice = None;
        self.config = None;
        self.stats = SurfaceStats::default();
        self.time = -1;
        self.state = EngineState::Uninitialized;
        Ok(())
    }

    // ── accessors ──────────────────────────────────────────────────

    /// Lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Time of the last step, `-1` before the first.
    pub fn time(&self) -> i64 {
        self.time
    }

    /// Scaled time of the last step under the run's policy, or `None`
    /// before the first step.
    pub fn scaled_time(&self) -> Option<u64> {
        if self.time < 0 {
            return None;
        }
        u64::try_from(self.policy.scaled_time(self.time)).ok()
    }

    /// Height statistics after the last step.
    pub fn stats(&self) -> SurfaceStats {
        self.stats
    }

    /// Current surface width, computed from the column heights.
    pub fn surface_width(&self) -> f64 {
        surface_width(self.heights(), self.stats.average_height)
    }

    /// Column heights; empty outside a run.
    pub fn heights(&self) -> &[i64] {
        self.lattice
            .as_ref()
            .map(RollingLattice::heights)
            .unwrap_or(&[])
    }

    /// The lattice of the current run.
    pub fn lattice(&self) -> Option<&RollingLattice> {
        self.lattice.as_ref()
    }

    /// Configuration of the current run.
    pub fn config(&self) -> Option<&EngineConfig> {
        self.config.as_ref()
    }

    /// Parameter map of the current run.
    pub fn parameters(&self) -> Option<&ParamMap> {
        self.config.as_ref().map(|c| &c.params)
    }

    /// Recorded width series.
    pub fn series(&self) -> &PagedSeries<S> {
        &self.series
    }

    /// Mutable access to the width series, for analysis reads that page.
    pub fn series_mut(&mut self) -> &mut PagedSeries<S> {
        &mut self.series
    }

    /// Recorded width at series index `index`.
    pub fn width_at(&mut self, index: u64) -> Result<f64, SeriesError> {
        self.series.get(index)
    }

    /// The placement rule.
    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// The time-scale policy of the current run.
    pub fn policy(&self) -> &TimeScalePolicy {
        &self.policy
    }

    /// Run counters, including current paging stats.
    pub fn metrics(&self) -> RunMetrics {
        RunMetrics {
            paging: self.series.stats(),
            ..self.metrics.clone()
        }
    }
}

impl<R: PlacementRule, S: PageStore> fmt::Debug for DepositionEngine<R, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DepositionEngine")
            .field("rule", &self.rule.name())
            .field("state", &self.state)
            .field("time", &self.time)
            .field("stats", &self.stats)
            .field("series", &self.series)
            .finish()
    }
}
