//! The fake-factor pipeline: raw rate, lepton-pt closure, process-specific
//! closure, then fraction-weighted combination.

pub mod closure;
pub mod engine;
pub mod lpt;
pub mod raw;

pub use closure::{MtClosure, TopoClosure};
pub use engine::{ClippedInput, FakeFactorEngine, ProcessFactors};
pub use lpt::LeptonPtClosure;
pub use raw::RawRateEvaluator;
