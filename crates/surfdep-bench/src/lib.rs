//! Benchmark profiles for the surfdep deposition engine.
//!
//! - [`reference_params`]: 256 columns, the width used for routine runs
//! - [`stress_params`]: 4096 columns with a tall logical height
//! - [`ballistic_engine`]: an initialized ballistic engine over memory pages

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use surfdep_core::{keys, ParamMap};
use surfdep_engine::{ConfigError, DepositionEngine};
use surfdep_models::BallisticDeposition;
use surfdep_series::MemoryStore;

/// Reference profile: L = 256, H = 8192, dH = 512, linear time.
pub fn reference_params(seed: u64) -> ParamMap {
    ParamMap::new()
        .with(keys::LENGTH, 256.0)
        .with(keys::HEIGHT, 8192.0)
        .with(keys::BUFFER_HEIGHT, 512.0)
        .with(keys::SEED, seed as f64)
}

/// Stress profile: L = 4096, H = 2^20, dH = 1024, with 64K-entry pages
/// so long runs page regularly.
pub fn stress_params(seed: u64) -> ParamMap {
    ParamMap::new()
        .with(keys::LENGTH, 4096.0)
        .with(keys::HEIGHT, f64::from(1u32 << 20))
        .with(keys::BUFFER_HEIGHT, 1024.0)
        .with(keys::PAGE_LEN, 65_536.0)
        .with(keys::SEED, seed as f64)
}

/// A ballistic engine initialized from `params`, ready to step.
pub fn ballistic_engine(
    params: &ParamMap,
) -> Result<DepositionEngine<BallisticDeposition, MemoryStore>, ConfigError> {
    let mut engine = DepositionEngine::new(BallisticDeposition::new(0), MemoryStore::new())?;
    engine.init(params)?;
    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_initialize() {
        for params in [reference_params(1), stress_params(1)] {
            let mut engine = ballistic_engine(&params).unwrap();
            engine.step().unwrap();
            assert_eq!(engine.series().len(), 1);
        }
    }
}
