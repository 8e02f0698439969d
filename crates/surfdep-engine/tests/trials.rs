//! Integration test: batches of trials.
//!
//! Column-cycling runs have a known periodic width, so ensemble cells,
//! saturated averages and the cross-size α fit have exact values.

use surfdep_analysis::EnsembleAverages;
use surfdep_core::{keys, ModelId, ParamMap};
use surfdep_engine::{
    run_trials, AnalysisWindow, DepositionEngine, RunStop, TrialPlan, MAX_SEED,
};
use surfdep_series::MemoryStore;
use surfdep_test_utils::ColumnCycleRule;

const EPS: f64 = 1e-9;

fn plan(l: f64, trials: u64, steps: u64) -> TrialPlan {
    let params = ParamMap::new()
        .with(keys::LENGTH, l)
        .with(keys::HEIGHT, 4096.0)
        .with(keys::BUFFER_HEIGHT, 64.0)
        .with(keys::SEED, 7.0)
        .with(keys::PAGE_LEN, 128.0);
    let mut plan = TrialPlan::new(params, trials);
    plan.max_steps = Some(steps);
    plan.window = AnalysisWindow {
        t0: 1,
        growth_end: 50,
        saturation_start: 200,
    };
    plan
}

/// Mean width over whole periods of a column-cycling run on `l` columns.
fn saturated_width(l: u32) -> f64 {
    let l = f64::from(l);
    (1..=l as u32)
        .map(|k| {
            let p = f64::from(k) / l;
            (p * (1.0 - p)).sqrt()
        })
        .sum::<f64>()
        / l
}

fn engine() -> DepositionEngine<ColumnCycleRule, MemoryStore> {
    DepositionEngine::new(ColumnCycleRule::new(), MemoryStore::new()).unwrap()
}

#[test]
fn trials_fill_the_ensemble_and_offset_seeds() {
    let plan = plan(4.0, 2, 400);
    let mut ctx = plan.context();
    let mut ensemble = EnsembleAverages::new();
    let mut engine = engine();

    let reports = run_trials(&mut engine, &plan, &mut ctx, &mut ensemble).unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(ctx.remaining(), 0);
    assert_eq!(ctx.peek_id(), ModelId(2));
    assert_eq!(engine.rule().reseeds, vec![7, 8]);

    // Linear scale with period 1: one cell per step, two samples each.
    assert_eq!(ensemble.len(), 400);
    let cell = ensemble.get(4, 1).unwrap();
    assert_eq!(cell.width.samples, 2);
    assert!((cell.width.value - 0.5).abs() < EPS);
    assert!((cell.height.value - 0.5).abs() < EPS);

    for (i, report) in reports.iter().enumerate() {
        assert_eq!(report.stop, RunStop::StepLimit);
        assert_eq!(report.metrics.steps, 400);
        let record = &report.record;
        assert_eq!(record.model_id, ModelId(i as u64));
        assert_eq!(record.length, 4);
        assert_eq!(record.time, 399);
        assert_eq!(record.average_height, 100.0);
        assert_eq!(record.width, 0.0);
        assert!(record.beta.is_some_and(f64::is_finite));
        let lnw = record.ln_width_avg.unwrap();
        assert!((lnw - saturated_width(4).ln()).abs() < EPS);
    }
    // Identical runs: the running β average equals each β.
    assert_eq!(reports[1].record.beta_avg, reports[0].record.beta);
    // One size point is not enough for an α fit.
    assert!(reports[0].alpha_fit.is_none());
}

#[test]
fn alpha_fit_spans_lattice_widths() {
    let small = plan(4.0, 2, 400);
    let large = plan(8.0, 1, 400);
    let mut ctx = small.context();
    let mut ensemble = EnsembleAverages::new();
    let mut engine = engine();

    run_trials(&mut engine, &small, &mut ctx, &mut ensemble).unwrap();
    ctx.add_trials(large.trials);
    let reports = run_trials(&mut engine, &large, &mut ctx, &mut ensemble).unwrap();

    let report = &reports[0];
    assert_eq!(report.record.model_id, ModelId(2));
    assert_eq!(ctx.sizes().len(), 3);
    let fit = report.alpha_fit.unwrap();
    let expected = (saturated_width(8).ln() - saturated_width(4).ln()) / 2f64.ln();
    assert!((fit.slope - expected).abs() < EPS, "alpha = {}", fit.slope);
    assert_eq!(report.record.alpha, Some(fit.slope));
    assert_eq!(report.record.r_squared, Some(fit.r_squared));

    assert_eq!(ensemble.for_length(4).count(), 400);
    assert_eq!(ensemble.for_length(8).count(), 400);
}

#[test]
fn cohort_clears_on_schedule() {
    let plan = plan(4.0, 3, 400);
    let mut ctx = plan.context().with_clear_every(2);
    let mut ensemble = EnsembleAverages::new();
    let mut engine = engine();

    let reports = run_trials(&mut engine, &plan, &mut ctx, &mut ensemble).unwrap();
    assert_eq!(reports.len(), 3);
    // Trials 0 and 1 formed a cohort; trial 2 starts a new one.
    assert_eq!(reports[2].record.beta_avg, reports[2].record.beta);
    assert_eq!(ctx.betas().len(), 1);
    assert_eq!(ctx.sizes().len(), 1);
    // The ensemble is independent of the cohort.
    assert_eq!(ensemble.get(4, 0).unwrap().width.samples, 3);
}

#[test]
fn short_run_contributes_no_size_point() {
    let mut plan = plan(4.0, 1, 100);
    plan.window.saturation_start = 500;
    let mut ctx = plan.context();
    let mut ensemble = EnsembleAverages::new();
    let mut engine = engine();

    let reports = run_trials(&mut engine, &plan, &mut ctx, &mut ensemble).unwrap();
    let record = &reports[0].record;
    assert_eq!(record.ln_width_avg, None);
    assert_eq!(record.alpha, None);
    assert!(record.beta.is_some());
    assert!(ctx.sizes().is_empty());
    let exported = record.to_map();
    assert_eq!(exported.get("lnw_avg"), None);
    assert_eq!(exported.get(keys::MODEL_ID), Some(0.0));
}

#[test]
fn malformed_base_seed_is_rejected() {
    let mut plan = plan(4.0, 1, 10);
    plan.params.set(keys::SEED, 2.5);
    let mut ctx = plan.context();
    let mut ensemble = EnsembleAverages::new();
    assert!(run_trials(&mut engine(), &plan, &mut ctx, &mut ensemble).is_err());
    assert!(ensemble.is_empty());
}

#[test]
fn seed_overflow_rejects_the_batch_before_any_trial() {
    let mut plan = plan(4.0, 3, 10);
    plan.params.set(keys::SEED, (MAX_SEED - 1) as f64);
    let mut ctx = plan.context();
    let mut ensemble = EnsembleAverages::new();
    let mut engine = engine();
    assert!(run_trials(&mut engine, &plan, &mut ctx, &mut ensemble).is_err());
    assert_eq!(ctx.remaining(), 3);
    assert_eq!(ctx.peek_id(), ModelId(0));
    assert!(engine.rule().reseeds.is_empty());
    assert!(ensemble.is_empty());
}

#[test]
fn logarithmic_scale_records_cells_when_the_bucket_advances() {
    let mut plan = plan(4.0, 2, 60);
    plan.params.set(keys::SCALE_FACTOR, 0.5);
    let mut ctx = plan.context();
    let mut ensemble = EnsembleAverages::new();
    let mut engine = engine();

    let reports = run_trials(&mut engine, &plan, &mut ctx, &mut ensemble).unwrap();
    assert_eq!(reports.len(), 2);
    // floor(2 ln t) advances at t = 1, 2, 3, 5, 8, 13, 21, 34, 55.
    assert_eq!(ensemble.len(), 9);
    assert!(ensemble.get(4, 0).is_none());
    assert!(ensemble.get(4, 4).is_none());
    for t in [1, 2, 3, 5, 8, 13, 21, 34, 55] {
        let cell = ensemble.get(4, t).unwrap();
        assert_eq!(cell.width.samples, 2, "t = {t}");
    }
    // Every step is still measured.
    assert_eq!(engine.series().len(), 60);
}
