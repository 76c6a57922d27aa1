//! b-tag veto weights.

pub mod fits;
pub mod weighter;

pub use fits::FitSet;
pub use weighter::VetoWeighter;
