//! Run configuration, validation, and error types.
//!
//! [`EngineConfig`] is the typed view of a run's [`ParamMap`].
//! [`validate()`](EngineConfig::validate) checks every structural
//! invariant before the engine allocates anything.

use std::error::Error;
use std::fmt;

use surfdep_core::{keys, ParamError, ParamMap};
use surfdep_lattice::LatticeError;
use surfdep_series::{SeriesError, MAX_PAGE_LEN};

use crate::policy::TimeScale;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while building or validating an [`EngineConfig`],
/// or while allocating the run it describes.
#[derive(Debug)]
pub enum ConfigError {
    /// A parameter is missing or malformed.
    Param(ParamError),
    /// `L` is zero.
    EmptyLattice,
    /// `dH` violates `2 <= dH <= H` or is odd.
    InvalidBufferHeight {
        /// The configured `dH`.
        buffer_height: u64,
        /// The configured `H`.
        max_height: u64,
    },
    /// The time-scale parameters are inconsistent or out of range.
    InvalidTimeScale {
        /// Description of which constraint was violated.
        reason: String,
    },
    /// The lattice rejected the dimensions.
    Lattice(LatticeError),
    /// Resetting the width series failed.
    Series(SeriesError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Param(e) => write!(f, "parameter: {e}"),
            Self::EmptyLattice => write!(f, "lattice width L must be at least 1"),
            Self::InvalidBufferHeight {
                buffer_height,
                max_height,
            } => write!(
                f,
                "buffer height dH = {buffer_height} must be even and in [2, H = {max_height}]"
            ),
            Self::InvalidTimeScale { reason } => write!(f, "invalid time scale: {reason}"),
            Self::Lattice(e) => write!(f, "lattice: {e}"),
            Self::Series(e) => write!(f, "width series: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Param(e) => Some(e),
            Self::Lattice(e) => Some(e),
            Self::Series(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParamError> for ConfigError {
    fn from(e: ParamError) -> Self {
        Self::Param(e)
    }
}

impl From<LatticeError> for ConfigError {
    fn from(e: LatticeError) -> Self {
        Self::Lattice(e)
    }
}

impl From<SeriesError> for ConfigError {
    fn from(e: SeriesError) -> Self {
        Self::Series(e)
    }
}

// ── EngineConfig ───────────────────────────────────────────────────

/// Everything one run needs, parsed from a [`ParamMap`].
///
/// The source map is kept in [`params`](Self::params) so model rates
/// and host knobs the engine does not interpret travel with the run.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Lattice width `L`.
    pub length: usize,
    /// Logical maximum height `H`.
    pub max_height: u64,
    /// Physical buffer height `dH`.
    pub buffer_height: u64,
    /// Seed passed to the placement rule on init.
    pub seed: u64,
    /// Entries per page of the width series.
    pub page_len: usize,
    /// Time-scale policy for the run.
    pub time_scale: TimeScale,
    /// Steps between host display refreshes, if the host set one.
    pub steps_per_display: Option<u64>,
    /// The full parameter map the config was built from.
    pub params: ParamMap,
}

impl EngineConfig {
    /// Parse `params`.
    ///
    /// `L`, `H` and `dH` are required. `A` (non-zero) selects the
    /// logarithmic scale, `heightAveraged = 1` the height-averaged one;
    /// setting both is an error. Otherwise the linear scale averages
    /// every `averagePeriod` steps (default 1). `pageLen` defaults to
    /// `L * H` capped at [`MAX_PAGE_LEN`].
    ///
    /// # Errors
    ///
    /// [`ConfigError::Param`] naming the first missing or malformed key.
    /// Structural checks are left to [`validate`](Self::validate).
    pub fn from_params(params: &ParamMap) -> Result<Self, ConfigError> {
        let length = params.require_u64(keys::LENGTH)?;
        let max_height = params.require_u64(keys::HEIGHT)?;
        let buffer_height = params.require_u64(keys::BUFFER_HEIGHT)?;
        let seed = params.get_u64(keys::SEED)?.unwrap_or(0);
        let steps_per_display = params.get_u64(keys::STEPS_PER_DISPLAY)?;

        let length = usize::try_from(length).map_err(|_| ParamError::Invalid {
            key: keys::LENGTH.to_string(),
            value: length as f64,
            reason: "exceeds addressable memory".to_string(),
        })?;

        let page_len = match params.get_u64(keys::PAGE_LEN)? {
            Some(n) => usize::try_from(n).unwrap_or(MAX_PAGE_LEN),
            None => usize::try_from((length as u64).saturating_mul(max_height))
                .unwrap_or(MAX_PAGE_LEN),
        }
        .clamp(1, MAX_PAGE_LEN);

        let scale_factor = params.get_or(keys::SCALE_FACTOR, 0.0);
        let height_averaged = params.get_or(keys::HEIGHT_AVERAGED, 0.0) == 1.0;
        let time_scale = match (scale_factor != 0.0, height_averaged) {
            (true, true) => {
                return Err(ConfigError::InvalidTimeScale {
                    reason: format!(
                        "'{}' and '{}' select different time scales",
                        keys::SCALE_FACTOR,
                        keys::HEIGHT_AVERAGED
                    ),
                })
            }
            (true, false) => TimeScale::Logarithmic { scale_factor },
            (false, true) => TimeScale::HeightAveraged,
            (false, false) => TimeScale::Linear {
                average_period: params.get_u64(keys::AVERAGE_PERIOD)?.unwrap_or(1),
            },
        };

        Ok(Self {
            length,
            max_height,
            buffer_height,
            seed,
            page_len,
            time_scale,
            steps_per_display,
            params: params.clone(),
        })
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.length == 0 {
            return Err(ConfigError::EmptyLattice);
        }
        let dh = self.buffer_height;
        if dh < 2 || dh % 2 != 0 || dh > self.max_height || i64::try_from(self.max_height).is_err()
        {
            return Err(ConfigError::InvalidBufferHeight {
                buffer_height: dh,
                max_height: self.max_height,
            });
        }
        match self.time_scale {
            TimeScale::Linear { average_period: 0 } => Err(ConfigError::InvalidTimeScale {
                reason: "averaging period must be at least 1".to_string(),
            }),
            TimeScale::Logarithmic { scale_factor }
                if !scale_factor.is_finite() || scale_factor <= 0.0 =>
            {
                Err(ConfigError::InvalidTimeScale {
                    reason: format!("scale factor A must be finite and > 0, got {scale_factor}"),
                })
            }
            _ => Ok(()),
        }
    }

    /// `H` as a signed logical height. Valid after [`validate`](Self::validate).
    pub fn max_height_i64(&self) -> i64 {
        i64::try_from(self.max_height).unwrap_or(i64::MAX)
    }
}
