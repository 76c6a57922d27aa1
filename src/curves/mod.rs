//! Correction curves: functional forms, naming, artifact files and the store.

pub mod artifacts;
pub mod curve;
pub mod names;
pub mod store;

pub use artifacts::{ArtifactKind, ArtifactPaths, CurveFile, CurveSpec, read_curve_file, write_curve_file};
pub use curve::{CorrectionCurve, CurveForm};
pub use store::{CurveHandle, CurveStore};
