//! `ff-weights` library crate.
//!
//! Jet-to-tau fake-factor weights built from a registry of fitted correction
//! curves, plus the b-tag veto weight. The binary (`ff`) is a thin wrapper
//! around this library.
//!
//! - `curves`: curve forms, artifact files, the validated curve store
//! - `ff`: raw rates, closures and the combining engine
//! - `btag`: b-tag veto weights
//! - `fractions`, `io`, `app::pipeline`: batch weighting of event tables

pub mod app;
pub mod btag;
pub mod cli;
pub mod curves;
pub mod domain;
pub mod error;
pub mod ff;
pub mod fractions;
pub mod io;
pub mod report;
