//! Batches of independent runs analysed as a cohort.
//!
//! [`TrialContext`] is the explicit home of the batch bookkeeping: the
//! next model id, how many trials remain, and the cohort of finished
//! runs whose β and saturated widths feed the running β average and the
//! α fit. [`run_trials`] drives an engine through a [`TrialPlan`].

use std::error::Error;
use std::fmt;

use surfdep_analysis::{
    alpha, average_beta, beta, saturated_ln_width_avg, AnalysisError, EnsembleAverages,
    Regression, SizePoint, StatsRecord,
};
use surfdep_core::{keys, ModelId, ParamError, ParamMap};
use surfdep_lattice::PlacementRule;
use surfdep_series::{PageStore, SeriesError};
use tracing::{info, warn};

use crate::config::ConfigError;
use crate::engine::{DepositionEngine, RunStop, StepError};
use crate::guard::HeightGuard;
use crate::metrics::RunMetrics;

// ── TrialError ─────────────────────────────────────────────────────

/// Errors that abort a batch of trials.
#[derive(Debug)]
pub enum TrialError {
    /// A trial's parameters were rejected.
    Config(ConfigError),
    /// A step failed.
    Step(StepError),
    /// Post-run analysis failed.
    Analysis(AnalysisError),
    /// The width series failed outside a step.
    Series(SeriesError),
}

impl fmt::Display for TrialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "trial config: {e}"),
            Self::Step(e) => write!(f, "trial step: {e}"),
            Self::Analysis(e) => write!(f, "trial analysis: {e}"),
            Self::Series(e) => write!(f, "trial series: {e}"),
        }
    }
}

impl Error for TrialError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Step(e) => Some(e),
            Self::Analysis(e) => Some(e),
            Self::Series(e) => Some(e),
        }
    }
}

impl From<ConfigError> for TrialError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<StepError> for TrialError {
    fn from(e: StepError) -> Self {
        Self::Step(e)
    }
}

impl From<AnalysisError> for TrialError {
    fn from(e: AnalysisError) -> Self {
        Self::Analysis(e)
    }
}

impl From<SeriesError> for TrialError {
    fn from(e: SeriesError) -> Self {
        Self::Series(e)
    }
}

// ── TrialContext ───────────────────────────────────────────────────

/// Bookkeeping for a batch of trials.
#[derive(Clone, Debug, Default)]
pub struct TrialContext {
    next_id: ModelId,
    remaining: u64,
    clear_every: Option<u64>,
    betas: Vec<f64>,
    sizes: Vec<SizePoint>,
}

impl TrialContext {
    /// Context that will run `trials` trials, numbering from 0.
    pub fn new(trials: u64) -> Self {
        Self {
            remaining: trials,
            ..Self::default()
        }
    }

    /// Reset the cohort after every trial whose id `n` satisfies
    /// `(n + 1) % every == 0`. Zero disables resets.
    pub fn with_clear_every(mut self, every: u64) -> Self {
        self.clear_every = (every > 0).then_some(every);
        self
    }

    /// Queue `trials` more trials. Ids and the cohort carry on, so a
    /// context can span plans with different lattice widths.
    pub fn add_trials(&mut self, trials: u64) {
        self.remaining = self.remaining.saturating_add(trials);
    }

    /// Trials still to run.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Id the next trial will receive.
    pub fn peek_id(&self) -> ModelId {
        self.next_id
    }

    /// Take the next model id.
    pub fn next_model_id(&mut self) -> ModelId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }

    /// Finished runs' β values in the current cohort.
    pub fn betas(&self) -> &[f64] {
        &self.betas
    }

    /// Finished runs' saturated widths in the current cohort.
    pub fn sizes(&self) -> &[SizePoint] {
        &self.sizes
    }

    /// Add a finished run to the cohort.
    pub fn record(&mut self, beta: Option<f64>, size: Option<SizePoint>) {
        if let Some(b) = beta.filter(|b| b.is_finite()) {
            self.betas.push(b);
        }
        if let Some(p) = size {
            self.sizes.push(p);
        }
    }

    /// Mean β over the cohort.
    pub fn beta_avg(&self) -> Option<f64> {
        average_beta(&self.betas)
    }

    /// α fit over the cohort; needs two or more sizes.
    pub fn alpha_fit(&self) -> Option<Regression> {
        (self.sizes.len() >= 2).then(|| alpha(&self.sizes))
    }

    /// Mark trial `id` done: count it off and reset the cohort if due.
    pub fn finish(&mut self, id: ModelId) {
        self.remaining = self.remaining.saturating_sub(1);
        if let Some(every) = self.clear_every {
            if (id.0 + 1) % every == 0 {
                self.clear_cohort();
            }
        }
    }

    /// Forget every finished run.
    pub fn clear_cohort(&mut self) {
        self.betas.clear();
        self.sizes.clear();
    }
}

// ── TrialPlan ──────────────────────────────────────────────────────

/// Largest per-trial seed: every integer up to 2^53 survives the trip
/// through an `f64` parameter.
pub const MAX_SEED: u64 = 1 << 53;

/// Series index windows used to analyse each run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnalysisWindow {
    /// First index of the growth window.
    pub t0: u64,
    /// Last index of the growth window (the crossover time). 0 skips β.
    pub growth_end: u64,
    /// First index of the saturated regime.
    pub saturation_start: u64,
}

/// What each trial of a batch runs.
#[derive(Clone, Debug)]
pub struct TrialPlan {
    /// Parameters shared by every trial. `seed` is offset by the model
    /// id so trials are independent but reproducible.
    pub params: ParamMap,
    /// Number of trials to run when the context does not say otherwise.
    pub trials: u64,
    /// Per-trial step budget; `None` runs until the guard trips.
    pub max_steps: Option<u64>,
    /// Stop condition.
    pub guard: HeightGuard,
    /// Analysis windows.
    pub window: AnalysisWindow,
}

impl TrialPlan {
    /// Plan running `trials` trials of `params` with default guard and
    /// windows.
    pub fn new(params: ParamMap, trials: u64) -> Self {
        Self {
            params,
            trials,
            max_steps: None,
            guard: HeightGuard::default(),
            window: AnalysisWindow::default(),
        }
    }

    /// A [`TrialContext`] sized for this plan.
    pub fn context(&self) -> TrialContext {
        TrialContext::new(self.trials)
    }

    /// Parameters for the trial with id `id`.
    ///
    /// The trial's seed is `seed + id`. Parameters travel as `f64`, so
    /// that sum must not exceed [`MAX_SEED`] (2^53).
    ///
    /// # Errors
    ///
    /// [`ParamError::Invalid`] if the base `seed` is not a non-negative
    /// integer, or if the offset seed exceeds [`MAX_SEED`].
    pub fn params_for(&self, id: ModelId) -> Result<ParamMap, ParamError> {
        let base_seed = self.params.get_u64(keys::SEED)?.unwrap_or(0);
        let seed = base_seed
            .checked_add(id.0)
            .filter(|&s| s <= MAX_SEED)
            .ok_or_else(|| ParamError::Invalid {
                key: keys::SEED.to_string(),
                value: base_seed as f64,
                reason: format!("seed offset by model id {id} exceeds 2^53"),
            })?;
        Ok(self
            .params
            .clone()
            .with(keys::MODEL_ID, id.0 as f64)
            .with(keys::SEED, seed as f64))
    }
}

/// Result of one trial.
#[derive(Clone, Debug)]
pub struct TrialReport {
    /// Export row for the trial, with cohort statistics as of its end.
    pub record: StatsRecord,
    /// Why the run ended.
    pub stop: RunStop,
    /// Run counters.
    pub metrics: RunMetrics,
    /// The β fit, if the growth window was usable.
    pub beta_fit: Option<Regression>,
    /// The cohort α fit, if two or more sizes were available.
    pub alpha_fit: Option<Regression>,
}

/// Run every remaining trial of `ctx` on `engine`.
///
/// Each trial initialises the engine from
/// [`plan.params_for(id)`](TrialPlan::params_for), steps until the plan's
/// guard or step budget stops it, and folds width and average height
/// into `ensemble` at every step where averages are due. The run is
/// then analysed: β over `[t0, growth_end]` (clamped to the recorded
/// series) and the saturated ln-width average from `saturation_start`.
/// A run too short for its saturation window contributes no α point.
pub fn run_trials<R, S>(
    engine: &mut DepositionEngine<R, S>,
    plan: &TrialPlan,
    ctx: &mut TrialContext,
    ensemble: &mut EnsembleAverages,
) -> Result<Vec<TrialReport>, TrialError>
where
    R: PlacementRule,
    S: PageStore,
{
    // The last trial has the largest seed; reject the batch before any
    // trial runs rather than part way through.
    if let Some(last) = ctx.remaining().checked_sub(1) {
        let last = ModelId(ctx.peek_id().0.saturating_add(last));
        plan.params_for(last).map_err(ConfigError::from)?;
    }
    let mut reports = Vec::with_capacity(ctx.remaining() as usize);
    while ctx.remaining() > 0 {
        let id = ctx.next_model_id();
        let params = plan.params_for(id).map_err(ConfigError::from)?;
        engine.init(&params)?;
        let length = engine.heights().len();
        info!(model_id = %id, length, remaining = ctx.remaining(), "trial started");

        let stop = engine.run_until_stopped_with(&plan.guard, plan.max_steps, |eng, out| {
            if !out.average_due {
                return;
            }
            if let (Some(w), Some(t)) = (out.width, eng.scaled_time()) {
                ensemble.record(length, t, w, eng.stats().average_height);
            }
        })?;

        let report = analyse(engine, plan, ctx, id, length, stop)?;
        info!(
            model_id = %id,
            steps = report.metrics.steps,
            beta = ?report.record.beta,
            alpha = ?report.record.alpha,
            "trial completed"
        );
        ctx.finish(id);
        reports.push(report);
    }
    Ok(reports)
}

fn analyse<R, S>(
    engine: &mut DepositionEngine<R, S>,
    plan: &TrialPlan,
    ctx: &mut TrialContext,
    id: ModelId,
    length: usize,
    stop: RunStop,
) -> Result<TrialReport, TrialError>
where
    R: PlacementRule,
    S: PageStore,
{
    let window = plan.window;
    let recorded = engine.series().len();

    let beta_fit = if recorded == 0 || window.t0 >= recorded {
        None
    } else {
        let growth_end = window.growth_end.min(recorded - 1);
        beta(engine.series_mut(), window.t0, growth_end)?
    };

    let ln_width_avg = if window.saturation_start < recorded {
        Some(saturated_ln_width_avg(
            engine.series_mut(),
            window.saturation_start,
        )?)
    } else {
        warn!(
            model_id = %id,
            recorded,
            saturation_start = window.saturation_start,
            "run ended before the saturation window"
        );
        None
    };

    let beta_value = beta_fit.map(|f| f.slope);
    ctx.record(
        beta_value,
        ln_width_avg.map(|ln_width_avg| SizePoint {
            length,
            ln_width_avg,
        }),
    );
    let alpha_fit = ctx.alpha_fit();

    let stats = engine.stats();
    let time = u64::try_from(engine.time()).unwrap_or(0);
    let mut record = StatsRecord::new(id, length, time, stats.average_height, engine.surface_width());
    record.beta = beta_value;
    record.beta_avg = ctx.beta_avg();
    record.ln_width_avg = ln_width_avg;
    record.alpha = alpha_fit.map(|f| f.slope);
    record.r_squared = alpha_fit.map(|f| f.r_squared);

    Ok(TrialReport {
        record,
        stop,
        metrics: engine.metrics(),
        beta_fit,
        alpha_fit,
    })
}
