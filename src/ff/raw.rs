//! Raw fake-factor rates.
//!
//! One curve in τ pt per (process, jet bucket); TT has a single curve with no
//! jet split. A matching `RawRate` systematic evaluates the fitted up/down
//! curve instead of the nominal one.

use crate::curves::names;
use crate::curves::{CurveHandle, CurveStore};
use crate::domain::{Direction, JetBucket, Process, Systematic, SystematicSelector, UncSource};
use crate::error::EngineError;

#[derive(Debug, Clone)]
struct RateCurves {
    nominal: CurveHandle,
    /// `[source][direction]`
    variants: [[CurveHandle; 2]; 2],
}

impl RateCurves {
    fn resolve(store: &CurveStore, process: Process, jets: JetBucket) -> Result<Self, EngineError> {
        let channel = store.channel();
        let variant = |source: UncSource, direction: Direction| {
            store.handle(&names::raw_rate_variant(channel, process, jets, source, direction))
        };
        Ok(Self {
            nominal: store.handle(&names::raw_rate(channel, process, jets))?,
            variants: [
                [variant(UncSource::Unc1, Direction::Up)?, variant(UncSource::Unc1, Direction::Down)?],
                [variant(UncSource::Unc2, Direction::Up)?, variant(UncSource::Unc2, Direction::Down)?],
            ],
        })
    }

    fn select(&self, source: Option<UncSource>, direction: Direction) -> CurveHandle {
        match source {
            None => self.nominal,
            Some(source) => self.variants[source.index()][direction_index(direction)],
        }
    }
}

pub(crate) fn direction_index(direction: Direction) -> usize {
    match direction {
        Direction::Up => 0,
        Direction::Down => 1,
    }
}

/// Evaluates the raw per-process rate curves.
#[derive(Debug, Clone)]
pub struct RawRateEvaluator {
    tt: RateCurves,
    /// Indexed by `JetBucket`.
    w: [RateCurves; 3],
    qcd: [RateCurves; 3],
}

impl RawRateEvaluator {
    pub fn new(store: &CurveStore) -> Result<Self, EngineError> {
        let buckets = |process| -> Result<[RateCurves; 3], EngineError> {
            Ok([
                RateCurves::resolve(store, process, JetBucket::Zero)?,
                RateCurves::resolve(store, process, JetBucket::One)?,
                RateCurves::resolve(store, process, JetBucket::TwoPlus)?,
            ])
        };
        Ok(Self {
            tt: RateCurves::resolve(store, Process::Tt, JetBucket::Zero)?,
            w: buckets(Process::W)?,
            qcd: buckets(Process::Qcd)?,
        })
    }

    /// Raw fake factor for `process` at τ pt `pt`. `jets` is ignored for TT.
    pub(crate) fn evaluate(
        &self,
        store: &CurveStore,
        process: Process,
        pt: f64,
        jets: JetBucket,
        selector: &SystematicSelector,
    ) -> f64 {
        let curves = match process {
            Process::Tt => &self.tt,
            Process::W => &self.w[jets.index()],
            Process::Qcd => &self.qcd[jets.index()],
        };
        let source = match selector.systematic {
            Systematic::RawRate {
                process: p,
                jets: j,
                source,
            } if p == process && (process == Process::Tt || j == jets) => Some(source),
            _ => None,
        };
        store.eval(curves.select(source, selector.direction), pt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::CorrectionCurve;
    use crate::curves::names::required_curves;
    use crate::domain::Channel;

    /// Store whose curves encode their identity: nominal = 1, unc1 = 10/11,
    /// unc2 = 20/21 (up/down), plus a per-bucket offset of 100 × bucket.
    fn tagged_store() -> CurveStore {
        let channel = Channel::MuTau;
        let curves = required_curves(channel).into_iter().map(|name| {
            let mut value = 1.0;
            if name.contains("_unc1_") {
                value = 10.0;
            }
            if name.contains("_unc2_") {
                value = 20.0;
            }
            if name.ends_with("_down") {
                value += 1.0;
            }
            if name.contains("_1jet") {
                value += 100.0;
            }
            if name.contains("_2jet") {
                value += 200.0;
            }
            CorrectionCurve::constant(name, value)
        });
        CurveStore::from_curves(channel, curves).unwrap()
    }

    #[test]
    fn nominal_selects_bucket_curve() {
        let store = tagged_store();
        let raw = RawRateEvaluator::new(&store).unwrap();
        let nominal = SystematicSelector::NOMINAL;
        assert_eq!(raw.evaluate(&store, Process::W, 40.0, JetBucket::Zero, &nominal), 1.0);
        assert_eq!(raw.evaluate(&store, Process::Qcd, 40.0, JetBucket::One, &nominal), 101.0);
        assert_eq!(raw.evaluate(&store, Process::W, 40.0, JetBucket::TwoPlus, &nominal), 201.0);
        // TT has no jet split.
        assert_eq!(raw.evaluate(&store, Process::Tt, 40.0, JetBucket::TwoPlus, &nominal), 1.0);
    }

    #[test]
    fn matching_systematic_substitutes_variant_curve() {
        let store = tagged_store();
        let raw = RawRateEvaluator::new(&store).unwrap();
        let sel = SystematicSelector::from_strings("ff_qcd_1jet_unc2", "down");
        assert_eq!(raw.evaluate(&store, Process::Qcd, 40.0, JetBucket::One, &sel), 121.0);
        let sel = SystematicSelector::from_strings("ff_qcd_1jet_unc1", "up");
        assert_eq!(raw.evaluate(&store, Process::Qcd, 40.0, JetBucket::One, &sel), 110.0);
        let sel = SystematicSelector::from_strings("ff_tt_0jet_unc1", "down");
        assert_eq!(raw.evaluate(&store, Process::Tt, 40.0, JetBucket::TwoPlus, &sel), 11.0);
    }

    #[test]
    fn systematic_for_other_bucket_or_process_is_nominal() {
        let store = tagged_store();
        let raw = RawRateEvaluator::new(&store).unwrap();
        let sel = SystematicSelector::from_strings("ff_w_0jet_unc1", "up");
        assert_eq!(raw.evaluate(&store, Process::W, 40.0, JetBucket::One, &sel), 101.0);
        assert_eq!(raw.evaluate(&store, Process::Qcd, 40.0, JetBucket::Zero, &sel), 1.0);
        assert_eq!(raw.evaluate(&store, Process::W, 40.0, JetBucket::Zero, &sel), 10.0);
    }
}
