//! String-keyed numeric parameter map.
//!
//! [`ParamMap`] is the interface between the orchestration layer and a
//! simulation run: lattice dimensions, model rates and scheduling knobs
//! all travel as `name -> f64`. Insertion order is preserved so exported
//! parameter listings are stable.

use indexmap::IndexMap;

use crate::error::ParamError;

/// Well-known parameter names.
pub mod keys {
    /// Lattice width `L`.
    pub const LENGTH: &str = "L";
    /// Logical maximum height `H`.
    pub const HEIGHT: &str = "H";
    /// Physical buffer height `dH`.
    pub const BUFFER_HEIGHT: &str = "dH";
    /// Seed for stochastic placement rules.
    pub const SEED: &str = "seed";
    /// Logarithmic time-scale factor. Non-zero selects logarithmic scaling.
    pub const SCALE_FACTOR: &str = "A";
    /// Set to 1 to select height-averaged time scaling.
    pub const HEIGHT_AVERAGED: &str = "heightAveraged";
    /// Averaging period for the default time scale.
    pub const AVERAGE_PERIOD: &str = "averagePeriod";
    /// Entries per page of the width series.
    pub const PAGE_LEN: &str = "pageLen";
    /// Host display cadence, carried through untouched.
    pub const STEPS_PER_DISPLAY: &str = "stepsPerDisplay";
    /// Sequential model identifier stamped by the trial context.
    pub const MODEL_ID: &str = "modelId";
}

/// An ordered mapping from parameter name to numeric value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamMap {
    values: IndexMap<String, f64>,
}

impl ParamMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`. Returns the previous value, if any.
    pub fn set(&mut self, key: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(key.into(), value)
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.set(key, value);
        self
    }

    /// Look up `key`.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Look up `key`, falling back to `default` when absent.
    pub fn get_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).unwrap_or(default)
    }

    /// Remove `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<f64> {
        self.values.shift_remove(key)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Overlay every entry of `other` onto `self`.
    pub fn merge(&mut self, other: &ParamMap) {
        for (k, v) in other.iter() {
            self.set(k, v);
        }
    }

    /// Look up a required key.
    ///
    /// # Errors
    ///
    /// [`ParamError::Missing`] naming the key when it is absent.
    pub fn require(&self, key: &str) -> Result<f64, ParamError> {
        self.get(key).ok_or_else(|| ParamError::Missing {
            key: key.to_string(),
        })
    }

    /// Look up a required key holding a non-negative integer.
    ///
    /// # Errors
    ///
    /// [`ParamError::Missing`] when absent, [`ParamError::Invalid`] when
    /// the value is negative, fractional, non-finite or too large.
    pub fn require_u64(&self, key: &str) -> Result<u64, ParamError> {
        let value = self.require(key)?;
        to_u64(key, value)
    }

    /// Like [`require_u64`](Self::require_u64) but optional.
    pub fn get_u64(&self, key: &str) -> Result<Option<u64>, ParamError> {
        self.get(key).map(|v| to_u64(key, v)).transpose()
    }
}

fn to_u64(key: &str, value: f64) -> Result<u64, ParamError> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(ParamError::Invalid {
            key: key.to_string(),
            value,
            reason: "expected a non-negative integer".to_string(),
        });
    }
    // 2^53: beyond this f64 cannot represent every integer.
    if value > 9_007_199_254_740_992.0 {
        return Err(ParamError::Invalid {
            key: key.to_string(),
            value,
            reason: "exceeds the exactly representable integer range".to_string(),
        });
    }
    Ok(value as u64)
}

impl<K: Into<String>> FromIterator<(K, f64)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.set(k, v);
        }
        map
    }
}
