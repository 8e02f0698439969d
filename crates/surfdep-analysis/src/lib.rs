//! Post-run scaling statistics.
//!
//! [`regress`] fits a straight line to a pair of scalar functions by
//! ordinary least squares. The scaling module builds the two standard
//! estimates on top of it: the growth exponent β from `ln w` against
//! `ln t`, and the roughness exponent α from the saturated `ln w`
//! against `ln L` across system sizes. [`EnsembleAverages`] and
//! [`StatsRecord`] carry results to a reporting layer.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod average;
pub mod error;
pub mod regression;
pub mod report;
pub mod scaling;

pub use average::{Average, EnsembleAverages, EnsembleEntry};
pub use error::AnalysisError;
pub use regression::{regress, regress_points, try_regress, Moments, Regression};
pub use report::StatsRecord;
pub use scaling::{alpha, average_beta, beta, saturated_ln_width_avg, SizePoint};
