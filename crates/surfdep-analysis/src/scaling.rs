//! Growth and roughness exponent estimates.
//!
//! Family-Vicsek scaling: in the growth regime `w ~ t^β`, and once
//! saturated `w_sat ~ L^α`. Both exponents are slopes on log-log axes.

use smallvec::SmallVec;
use surfdep_series::{PageStore, PagedSeries};

use crate::average::Average;
use crate::error::AnalysisError;
use crate::regression::{regress_points, try_regress, Regression};

/// One system size's contribution to the α fit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizePoint {
    /// Lattice width `L`.
    pub length: usize,
    /// Saturated ln-width average for that width.
    pub ln_width_avg: f64,
}

/// Fit `ln w(t)` against `ln t` for `t` in `[t0, tx]`.
///
/// `t` indexes the recorded series. Returns `None` when `tx` is 0: a run
/// whose crossover was never reached has no growth window. `t = 0` and
/// zero widths produce infinite logarithms and are skipped.
///
/// # Errors
///
/// [`AnalysisError::EmptyWindow`] if `t0 > tx`, or the series read
/// error if `tx` is past the end of the series.
pub fn beta<S: PageStore>(
    series: &mut PagedSeries<S>,
    t0: u64,
    tx: u64,
) -> Result<Option<Regression>, AnalysisError> {
    if tx == 0 {
        return Ok(None);
    }
    if t0 > tx {
        return Err(AnalysisError::EmptyWindow {
            from: t0,
            to: tx + 1,
        });
    }
    let fit = try_regress(
        |t| Ok::<_, AnalysisError>(t.ln()),
        |t| Ok(series.get(t as u64)?.ln()),
        t0 as f64,
        tx as f64,
        1.0,
    )?;
    Ok(Some(fit))
}

/// Natural log of the mean width over `[tx, len)`, the saturated regime.
///
/// # Errors
///
/// [`AnalysisError::EmptyWindow`] if `tx >= len`.
pub fn saturated_ln_width_avg<S: PageStore>(
    series: &mut PagedSeries<S>,
    tx: u64,
) -> Result<f64, AnalysisError> {
    let len = series.len();
    if tx >= len {
        return Err(AnalysisError::EmptyWindow { from: tx, to: len });
    }
    let mut avg = Average::default();
    for t in tx..len {
        avg = avg.with_sample(series.get(t)?);
    }
    Ok(avg.value.ln())
}

/// Fit saturated ln-width averages against `ln L`. The slope is α.
///
/// Points with a non-positive length are dropped.
pub fn alpha(points: &[SizePoint]) -> Regression {
    let pairs: SmallVec<[(f64, f64); 8]> = points
        .iter()
        .filter(|p| p.length > 0)
        .map(|p| ((p.length as f64).ln(), p.ln_width_avg))
        .collect();
    regress_points(pairs)
}

/// Mean of the finite β estimates, or `None` if there are none.
pub fn average_beta(betas: &[f64]) -> Option<f64> {
    let avg = betas
        .iter()
        .filter(|b| b.is_finite())
        .fold(Average::default(), |a, &b| a.with_sample(b));
    (avg.samples > 0).then_some(avg.value)
}
