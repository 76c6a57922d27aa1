//! Lepton-pt closure correction.
//!
//! The correction curve is chosen by (process, trigger family, τ-pt bucket) and
//! evaluated at the light-lepton pt. Bucket edges depend on the channel; a τ pt
//! at or below the lowest edge falls in no bucket and the correction is 1.
//!
//! The `LeptonPtClosure(process)` systematic scales the result by 1.1 / 0.9.

use crate::curves::names::{self, LeptonPtBuckets};
use crate::curves::{CurveHandle, CurveStore};
use crate::domain::{Process, Systematic, SystematicSelector};
use crate::error::EngineError;

/// Multiplicative lepton-pt closure for all processes of one channel.
#[derive(Debug, Clone)]
pub struct LeptonPtClosure {
    buckets: LeptonPtBuckets,
    /// `[process][cross_trigger as usize][bucket]`
    curves: [[[CurveHandle; 3]; 2]; 3],
}

impl LeptonPtClosure {
    pub fn new(store: &CurveStore) -> Result<Self, EngineError> {
        let channel = store.channel();
        let buckets = LeptonPtBuckets::for_channel(channel);
        let family = |process: Process, cross_trigger: bool| -> Result<[CurveHandle; 3], EngineError> {
            let [a, b, c] = buckets
                .labels
                .map(|label| store.handle(&names::lepton_pt_closure(channel, label, cross_trigger, process)));
            Ok([a?, b?, c?])
        };
        let per_process = |process: Process| -> Result<[[CurveHandle; 3]; 2], EngineError> {
            Ok([family(process, false)?, family(process, true)?])
        };
        Ok(Self {
            buckets,
            curves: [
                per_process(Process::Tt)?,
                per_process(Process::W)?,
                per_process(Process::Qcd)?,
            ],
        })
    }

    /// Closure factor for `process`, selecting the bucket by `tau_pt` and
    /// evaluating at `lepton_pt`.
    pub(crate) fn evaluate(
        &self,
        store: &CurveStore,
        process: Process,
        tau_pt: f64,
        lepton_pt: f64,
        cross_trigger: bool,
        selector: &SystematicSelector,
    ) -> f64 {
        let Some(bucket) = self.buckets.find(tau_pt) else {
            return 1.0;
        };
        let handle = self.curves[process.index()][usize::from(cross_trigger)][bucket];
        let value = store.eval(handle, lepton_pt);
        match selector.systematic {
            Systematic::LeptonPtClosure(p) if p == process => value * selector.direction.flat_scale(),
            _ => value,
        }
    }
}
