//! Statistics export record.

use surfdep_core::{keys, ModelId, ParamMap};

/// Export keys, in output order.
pub mod fields {
    /// Lattice width.
    pub const LENGTH: &str = "L";
    /// Scaled time.
    pub const TIME: &str = "t";
    /// Average column height.
    pub const AVERAGE_HEIGHT: &str = "h_avg";
    /// Surface width.
    pub const WIDTH: &str = "w";
    /// Growth exponent of this run.
    pub const BETA: &str = "beta";
    /// Growth exponent averaged over the cohort.
    pub const BETA_AVG: &str = "beta_avg";
    /// Saturated ln-width average.
    pub const LN_WIDTH_AVG: &str = "lnw_avg";
    /// Roughness exponent over the cohort.
    pub const ALPHA: &str = "alpha";
    /// Goodness of fit of the α regression.
    pub const R_SQUARED: &str = "R2";
}

/// One row of run statistics for a reporting layer.
///
/// Optional quantities are absent until the analysis that produces them
/// has run; [`to_map`](Self::to_map) leaves them out.
#[derive(Clone, Debug, PartialEq)]
pub struct StatsRecord {
    /// Run the record belongs to.
    pub model_id: ModelId,
    /// Lattice width `L`.
    pub length: usize,
    /// Scaled time at which the record was taken.
    pub time: u64,
    /// Average column height.
    pub average_height: f64,
    /// Surface width.
    pub width: f64,
    /// β of this run.
    pub beta: Option<f64>,
    /// β averaged over the cohort so far.
    pub beta_avg: Option<f64>,
    /// Saturated ln-width average of this run.
    pub ln_width_avg: Option<f64>,
    /// α over the cohort so far.
    pub alpha: Option<f64>,
    /// `R²` of the α fit.
    pub r_squared: Option<f64>,
}

impl StatsRecord {
    /// Record with only the instantaneous quantities filled in.
    pub fn new(model_id: ModelId, length: usize, time: u64, average_height: f64, width: f64) -> Self {
        Self {
            model_id,
            length,
            time,
            average_height,
            width,
            beta: None,
            beta_avg: None,
            ln_width_avg: None,
            alpha: None,
            r_squared: None,
        }
    }

    /// Ordered key/value view: `L, t, h_avg, w, beta, beta_avg, lnw_avg,
    /// alpha, R2, modelId`, skipping absent values.
    pub fn to_map(&self) -> ParamMap {
        let mut map = ParamMap::new()
            .with(fields::LENGTH, self.length as f64)
            .with(fields::TIME, self.time as f64)
            .with(fields::AVERAGE_HEIGHT, self.average_height)
            .with(fields::WIDTH, self.width);
        let optional = [
            (fields::BETA, self.beta),
            (fields::BETA_AVG, self.beta_avg),
            (fields::LN_WIDTH_AVG, self.ln_width_avg),
            (fields::ALPHA, self.alpha),
            (fields::R_SQUARED, self.r_squared),
        ];
        for (key, value) in optional {
            if let Some(v) = value {
                map.set(key, v);
            }
        }
        map.set(keys::MODEL_ID, self.model_id.0 as f64);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_keeps_export_order_and_skips_absent() {
        let mut rec = StatsRecord::new(ModelId(4), 64, 100, 12.5, 1.25);
        rec.beta = Some(0.31);
        rec.alpha = Some(0.5);
        let map = rec.to_map();
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["L", "t", "h_avg", "w", "beta", "alpha", "modelId"]);
        assert_eq!(map.get("modelId"), Some(4.0));
        assert_eq!(map.get("w"), Some(1.25));
    }
}
