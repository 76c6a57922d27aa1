//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - channel / process / jet-bucket tags (`Channel`, `Process`, `JetBucket`)
//! - systematic variations (`Systematic`, `SystematicSelector`, `Direction`)
//! - per-event inputs (`KinematicInput`, `ProcessFractions`, `TagCandidate`)
//! - b-tag configuration (`TagYear`, `WorkingPoint`, `Flavor`)

pub mod types;

pub use types::*;
