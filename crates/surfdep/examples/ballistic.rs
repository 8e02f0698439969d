//! Ballistic deposition across several lattice widths.
//!
//! Demonstrates:
//!   1. Building a run from a parameter map
//!   2. Paging widths to disk through a background writer
//!   3. Running a batch of trials per width with ensemble averaging
//!   4. Reading β per run and the cross-width α fit
//!
//! Run with:
//!   RUST_LOG=surfdep_engine=info cargo run --example ballistic

use std::error::Error;

use surfdep::models::seed_from_params;
use surfdep::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ─── Run parameters ─────────────────────────────────────────────

const WIDTHS: [u32; 3] = [16, 32, 64];
const TRIALS_PER_WIDTH: u64 = 4;
const STEPS_PER_COLUMN: u64 = 2_000;

fn params_for(length: u32) -> ParamMap {
    ParamMap::new()
        .with(keys::LENGTH, f64::from(length))
        .with(keys::HEIGHT, 8192.0)
        .with(keys::BUFFER_HEIGHT, 256.0)
        .with(keys::SEED, 2024.0)
        .with(keys::PAGE_LEN, 4096.0)
        .with(keys::SCALE_FACTOR, 0.05)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "surfdep_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let dir = std::env::temp_dir().join(format!("surfdep-ballistic-{}", std::process::id()));
    let store = BackgroundStore::spawn(FileStore::new(&dir))?;
    let rule = BallisticDeposition::new(seed_from_params(&params_for(WIDTHS[0]))?);
    let mut engine = DepositionEngine::new(rule, store)?;

    let mut ctx = TrialContext::new(0);
    let mut ensemble = EnsembleAverages::new();

    for length in WIDTHS {
        let steps = STEPS_PER_COLUMN * u64::from(length);
        let mut plan = TrialPlan::new(params_for(length), TRIALS_PER_WIDTH);
        plan.max_steps = Some(steps);
        plan.window = AnalysisWindow {
            t0: 1,
            growth_end: steps / 10,
            saturation_start: steps / 2,
        };

        ctx.add_trials(plan.trials);
        let reports = run_trials(&mut engine, &plan, &mut ctx, &mut ensemble)?;

        println!("L = {length}");
        for report in &reports {
            let r = &report.record;
            println!(
                "  model {:>2}  h_avg {:>8.2}  w {:>6.3}  beta {}  lnw_avg {}",
                r.model_id,
                r.average_height,
                r.width,
                fmt_opt(r.beta),
                fmt_opt(r.ln_width_avg),
            );
        }
        if let Some(last) = reports.last() {
            println!("  beta_avg {}", fmt_opt(last.record.beta_avg));
        }
    }

    match ctx.alpha_fit() {
        Some(fit) => println!("alpha = {:.4}  (R^2 = {:.4})", fit.slope, fit.r_squared),
        None => println!("alpha: not enough saturated runs"),
    }
    println!("ensemble cells: {}", ensemble.len());

    engine.clear_memory()?;
    drop(engine);
    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"))
}
