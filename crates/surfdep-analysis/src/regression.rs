//! Ordinary least squares over sampled function pairs.

use std::convert::Infallible;

/// Result of a straight-line fit `g = slope * f + intercept`.
///
/// Degenerate input is reported, not masked: with no usable samples, or
/// zero variance in the independent variable, the fields are `NaN` or
/// infinite per IEEE-754. Check [`is_finite`](Self::is_finite).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Regression {
    /// Fitted slope `m`.
    pub slope: f64,
    /// Fitted intercept `b`.
    pub intercept: f64,
    /// Coefficient of determination `R²`.
    pub r_squared: f64,
    /// Number of sample pairs that entered the fit.
    pub samples: usize,
}

impl Regression {
    /// Whether slope and intercept are both finite.
    pub fn is_finite(&self) -> bool {
        self.slope.is_finite() && self.intercept.is_finite()
    }
}

/// Running sums for the moment formulas.
///
/// Pairs where either value is infinite are skipped, which drops the
/// `ln 0` samples of unrecorded or zero-width points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Moments {
    n: usize,
    sf: f64,
    sg: f64,
    sfg: f64,
    sff: f64,
    sgg: f64,
}

impl Moments {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one `(f, g)` pair. Returns whether it was used.
    pub fn add(&mut self, f: f64, g: f64) -> bool {
        if f.is_infinite() || g.is_infinite() {
            return false;
        }
        self.n += 1;
        self.sf += f;
        self.sg += g;
        self.sfg += f * g;
        self.sff += f * f;
        self.sgg += g * g;
        true
    }

    /// Number of pairs used.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Whether no pair has been used.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Fit the accumulated pairs.
    pub fn finish(&self) -> Regression {
        let n = self.n as f64;
        let ef = self.sf / n;
        let eg = self.sg / n;
        let efg = self.sfg / n;
        let eff = self.sff / n;
        let egg = self.sgg / n;

        let cov = efg - ef * eg;
        let var_f = eff - ef * ef;
        let var_g = egg - eg * eg;

        let slope = cov / var_f;
        Regression {
            slope,
            intercept: eg - slope * ef,
            r_squared: cov * cov / (var_f * var_g),
            samples: self.n,
        }
    }
}

/// Fit `g(x)` against `f(x)` sampled at `x = x1, x1 + dx, ...` up to and
/// including `x2`.
///
/// A non-positive or non-finite `dx` samples `x1` alone.
///
/// ```
/// use surfdep_analysis::regress;
///
/// let fit = regress(|x| x, |x| 2.0 * x + 1.0, 0.0, 10.0, 1.0);
/// assert!((fit.slope - 2.0).abs() < 1e-9);
/// assert!((fit.intercept - 1.0).abs() < 1e-9);
/// ```
pub fn regress<F, G>(mut f: F, mut g: G, x1: f64, x2: f64, dx: f64) -> Regression
where
    F: FnMut(f64) -> f64,
    G: FnMut(f64) -> f64,
{
    match try_regress::<Infallible, _, _>(|x| Ok(f(x)), |x| Ok(g(x)), x1, x2, dx) {
        Ok(r) => r,
        Err(never) => match never {},
    }
}

/// [`regress`] over fallible functions. The first error aborts the fit.
pub fn try_regress<E, F, G>(
    mut f: F,
    mut g: G,
    x1: f64,
    x2: f64,
    dx: f64,
) -> Result<Regression, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    G: FnMut(f64) -> Result<f64, E>,
{
    let mut moments = Moments::new();
    let single = !(dx.is_finite() && dx > 0.0);
    let mut i = 0u64;
    loop {
        let x = x1 + i as f64 * dx;
        if x > x2 || x.is_nan() {
            break;
        }
        moments.add(f(x)?, g(x)?);
        if single {
            break;
        }
        i += 1;
    }
    Ok(moments.finish())
}

/// Fit explicit `(f, g)` pairs.
pub fn regress_points<I>(points: I) -> Regression
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut moments = Moments::new();
    for (f, g) in points {
        moments.add(f, g);
    }
    moments.finish()
}
