//! Process-specific closure corrections.
//!
//! - `MtClosure` (W only): curve in transverse mass; its two uncertainty
//!   sources replace the nominal curve with fitted up/down curves.
//! - `TopoClosure` (QCD only): OS/SS closure in ΔR(ℓ, τ); its systematic is a
//!   flat ±10% scaling.

use crate::curves::names;
use crate::curves::{CurveHandle, CurveStore};
use crate::domain::{Direction, Systematic, SystematicSelector, UncSource};
use crate::error::EngineError;
use crate::ff::raw::direction_index;

#[derive(Debug, Clone)]
pub struct MtClosure {
    nominal: CurveHandle,
    /// `[source][direction]`
    variants: [[CurveHandle; 2]; 2],
}

impl MtClosure {
    pub fn new(store: &CurveStore) -> Result<Self, EngineError> {
        let channel = store.channel();
        let variant = |source: UncSource, direction: Direction| {
            store.handle(&names::mt_closure(channel, Some((source, direction))))
        };
        Ok(Self {
            nominal: store.handle(&names::mt_closure(channel, None))?,
            variants: [
                [variant(UncSource::Unc1, Direction::Up)?, variant(UncSource::Unc1, Direction::Down)?],
                [variant(UncSource::Unc2, Direction::Up)?, variant(UncSource::Unc2, Direction::Down)?],
            ],
        })
    }

    pub(crate) fn evaluate(&self, store: &CurveStore, transverse_mass: f64, selector: &SystematicSelector) -> f64 {
        let handle = match selector.systematic {
            Systematic::MtClosure(source) => self.variants[source.index()][direction_index(selector.direction)],
            _ => self.nominal,
        };
        store.eval(handle, transverse_mass)
    }
}

#[derive(Debug, Clone)]
pub struct TopoClosure {
    curve: CurveHandle,
}

impl TopoClosure {
    pub fn new(store: &CurveStore) -> Result<Self, EngineError> {
        Ok(Self {
            curve: store.handle(&names::topo_closure(store.channel()))?,
        })
    }

    pub(crate) fn evaluate(&self, store: &CurveStore, distance: f64, selector: &SystematicSelector) -> f64 {
        let value = store.eval(self.curve, distance);
        match selector.systematic {
            Systematic::TopoClosure => value * selector.direction.flat_scale(),
            _ => value,
        }
    }
}
