//! Fraction-weighted fake-factor combination.

use crate::curves::{ArtifactPaths, CurveStore};
use crate::domain::{Channel, KinematicInput, Process, SystematicSelector};
use crate::error::EngineError;
use crate::ff::closure::{MtClosure, TopoClosure};
use crate::ff::lpt::LeptonPtClosure;
use crate::ff::raw::RawRateEvaluator;

const MAX_TAU_PT: f64 = 100.0;
const MAX_VISIBLE_MASS: f64 = 250.0;
const MAX_LEPTON_PT: f64 = 150.0;

/// Per-process fake factors before the fraction weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessFactors {
    pub tt: f64,
    pub qcd: f64,
    pub w: f64,
}

/// Inputs after clipping to the fitted domains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClippedInput {
    pub pt: f64,
    pub visible_mass: f64,
    pub lepton_pt: f64,
    pub missing_et: f64,
}

impl ClippedInput {
    pub fn from_input(kin: &KinematicInput) -> Self {
        Self {
            pt: kin.pt.min(MAX_TAU_PT),
            visible_mass: kin.visible_mass.min(MAX_VISIBLE_MASS),
            lepton_pt: kin.lepton_pt.min(MAX_LEPTON_PT),
            missing_et: kin.missing_et.max(0.0),
        }
    }
}

/// Fake-factor engine for one channel.
///
/// Holds the curve store and the handles every stage resolved from it. All
/// evaluation is read-only, so one engine can be shared across threads.
#[derive(Debug, Clone)]
pub struct FakeFactorEngine {
    store: CurveStore,
    raw: RawRateEvaluator,
    lpt: LeptonPtClosure,
    mt: MtClosure,
    topo: TopoClosure,
}

impl FakeFactorEngine {
    pub fn new(store: CurveStore) -> Result<Self, EngineError> {
        let raw = RawRateEvaluator::new(&store)?;
        let lpt = LeptonPtClosure::new(&store)?;
        let mt = MtClosure::new(&store)?;
        let topo = TopoClosure::new(&store)?;
        Ok(Self {
            store,
            raw,
            lpt,
            mt,
            topo,
        })
    }

    /// Load the artifacts for `channel` and build the engine.
    pub fn load(channel: Channel, paths: &ArtifactPaths) -> Result<Self, EngineError> {
        Self::new(CurveStore::load(channel, paths)?)
    }

    pub fn store(&self) -> &CurveStore {
        &self.store
    }

    pub fn channel(&self) -> Channel {
        self.store.channel()
    }

    /// Per-process fake factors for one event.
    pub fn components(&self, kin: &KinematicInput, selector: &SystematicSelector) -> ProcessFactors {
        let clipped = ClippedInput::from_input(kin);
        let jets = kin.jet_bucket();
        let store = &self.store;

        let raw = |process| self.raw.evaluate(store, process, clipped.pt, jets, selector);
        let lpt = |process| {
            self.lpt
                .evaluate(store, process, clipped.pt, clipped.lepton_pt, kin.cross_trigger, selector)
        };

        ProcessFactors {
            tt: raw(Process::Tt) * lpt(Process::Tt),
            qcd: raw(Process::Qcd) * lpt(Process::Qcd) * self.topo.evaluate(store, kin.distance, selector),
            w: raw(Process::W) * lpt(Process::W) * self.mt.evaluate(store, kin.transverse_mass, selector),
        }
    }

    /// Fraction-weighted fake factor for one event.
    pub fn evaluate(&self, kin: &KinematicInput, selector: &SystematicSelector) -> f64 {
        let ff = self.components(kin, selector);
        let frac = kin.fractions;
        frac.tt * ff.tt + frac.qcd * ff.qcd + frac.w * ff.w
    }

    /// String-keyed entry point: ordered 11-entry kinematic vector plus a
    /// systematic key and direction (`""` / `""` for nominal).
    pub fn get_ff(&self, kin: &[f64], key: &str, direction: &str) -> Result<f64, EngineError> {
        let input = KinematicInput::from_slice(kin)?;
        Ok(self.evaluate(&input, &SystematicSelector::from_strings(key, direction)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::names::required_curves;
    use crate::curves::store::tests::constant_store;
    use crate::curves::{CorrectionCurve, CurveForm};
    use crate::domain::{Direction, ProcessFractions, Systematic};
    use approx::assert_relative_eq;

    const KIN: [f64; 11] = [45.0, 30.0, 80.0, 40.0, 1.5, 20.0, 0.0, 0.0, 0.1, 0.3, 0.6];

    /// Every curve depends on its argument, so clipping and stage selection
    /// show up in the result.
    fn sloped_engine() -> FakeFactorEngine {
        let channel = Channel::MuTau;
        let curves = required_curves(channel).into_iter().enumerate().map(|(i, name)| {
            let form = CurveForm::Polynomial {
                coefficients: vec![0.5 + 0.01 * i as f64, 0.002],
            };
            CorrectionCurve::new(name, form, None).unwrap()
        });
        FakeFactorEngine::new(CurveStore::from_curves(channel, curves).unwrap()).unwrap()
    }

    #[test]
    fn stub_store_end_to_end() {
        let engine = FakeFactorEngine::new(constant_store(Channel::MuTau, 2.0)).unwrap();
        let input = KinematicInput::from_slice(&KIN).unwrap();
        let ff = engine.components(&input, &SystematicSelector::NOMINAL);
        assert_relative_eq!(ff.tt, 4.0);
        assert_relative_eq!(ff.qcd, 8.0);
        assert_relative_eq!(ff.w, 8.0);
        assert_relative_eq!(engine.get_ff(&KIN, "", "").unwrap(), 7.6, epsilon = 1e-12);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let engine = sloped_engine();
        let first = engine.get_ff(&KIN, "ff_w_0jet_unc1", "up").unwrap();
        for _ in 0..10 {
            assert_eq!(engine.get_ff(&KIN, "ff_w_0jet_unc1", "up").unwrap(), first);
        }
    }

    #[test]
    fn result_is_fraction_weighted_sum() {
        let engine = sloped_engine();
        let input = KinematicInput::from_slice(&KIN).unwrap();
        let ff = engine.components(&input, &SystematicSelector::NOMINAL);

        let store = engine.store();
        let raw_tt = store.evaluate("mc_rawFF_mt_tt", 45.0).unwrap();
        let lpt_tt = store.evaluate("closure_lpt_taupt30to50_mt_ttmc", 40.0).unwrap();
        assert_relative_eq!(ff.tt, raw_tt * lpt_tt);

        let raw_w = store.evaluate("rawFF_mt_w_0jet", 45.0).unwrap();
        let lpt_w = store.evaluate("closure_lpt_taupt30to50_mt_w", 40.0).unwrap();
        let mt_w = store.evaluate("closure_mt_mt_w", 30.0).unwrap();
        assert_relative_eq!(ff.w, raw_w * lpt_w * mt_w);

        let raw_qcd = store.evaluate("rawFF_mt_qcd_0jet", 45.0).unwrap();
        let lpt_qcd = store.evaluate("closure_lpt_taupt30to50_mt_qcd", 40.0).unwrap();
        let dr_qcd = store.evaluate("closure_OSSS_dr_flat_mt_qcd", 1.5).unwrap();
        assert_relative_eq!(ff.qcd, raw_qcd * lpt_qcd * dr_qcd);

        let expected = 0.1 * ff.tt + 0.3 * ff.qcd + 0.6 * ff.w;
        assert_relative_eq!(engine.get_ff(&KIN, "", "").unwrap(), expected);
    }

    #[test]
    fn inputs_are_clipped() {
        let engine = sloped_engine();
        let with = |index: usize, value: f64| {
            let mut kin = KIN;
            kin[index] = value;
            engine.get_ff(&kin, "", "").unwrap()
        };
        assert_eq!(with(0, 150.0), with(0, 100.0));
        assert_eq!(with(2, 999.0), with(2, 250.0));
        assert_eq!(with(3, 500.0), with(3, 150.0));
        assert_eq!(with(5, -5.0), with(5, 0.0));
        assert_ne!(with(3, 140.0), with(3, 150.0));
    }

    #[test]
    fn clipped_input_bounds() {
        let input = KinematicInput {
            pt: 180.0,
            visible_mass: 400.0,
            lepton_pt: 60.0,
            missing_et: -3.0,
            ..KinematicInput::default()
        };
        let clipped = ClippedInput::from_input(&input);
        assert_eq!(clipped.pt, 100.0);
        assert_eq!(clipped.visible_mass, 250.0);
        assert_eq!(clipped.lepton_pt, 60.0);
        assert_eq!(clipped.missing_et, 0.0);
    }

    #[test]
    fn unknown_systematic_is_nominal() {
        let engine = sloped_engine();
        let nominal = engine.get_ff(&KIN, "", "").unwrap();
        assert_eq!(engine.get_ff(&KIN, "not_a_real_key", "up").unwrap(), nominal);
        assert_eq!(engine.get_ff(&KIN, "", "down").unwrap(), nominal);
    }

    #[test]
    fn known_systematic_without_up_evaluates_down() {
        let engine = FakeFactorEngine::new(constant_store(Channel::MuTau, 2.0)).unwrap();
        let down = engine.get_ff(&KIN, "lptclosure_w", "down").unwrap();
        assert_relative_eq!(down, 0.1 * 4.0 + 0.3 * 8.0 + 0.6 * 8.0 * 0.9, epsilon = 1e-12);
        for dir in ["", "none", "sideways"] {
            assert_eq!(engine.get_ff(&KIN, "lptclosure_w", dir).unwrap(), down, "dir {dir:?}");
        }
        let osss = engine.get_ff(&KIN, "osssclosure_qcd", "none").unwrap();
        assert_relative_eq!(osss, 0.1 * 4.0 + 0.3 * 8.0 * 0.9 + 0.6 * 8.0, epsilon = 1e-12);
    }

    #[test]
    fn flat_closure_systematics_scale_one_process() {
        let engine = sloped_engine();
        let input = KinematicInput::from_slice(&KIN).unwrap();
        let nominal = engine.components(&input, &SystematicSelector::NOMINAL);

        let up = engine.components(&input, &SystematicSelector::new(Systematic::TopoClosure, Direction::Up));
        assert_relative_eq!(up.qcd / nominal.qcd, 1.1, max_relative = 1e-12);
        assert_eq!(up.w, nominal.w);
        assert_eq!(up.tt, nominal.tt);

        let down = engine.components(
            &input,
            &SystematicSelector::new(Systematic::LeptonPtClosure(Process::Tt), Direction::Down),
        );
        assert_relative_eq!(down.tt / nominal.tt, 0.9, max_relative = 1e-12);
        assert_eq!(down.qcd, nominal.qcd);
    }

    #[test]
    fn zero_fractions_give_zero() {
        let engine = sloped_engine();
        let input = KinematicInput {
            pt: 60.0,
            lepton_pt: 35.0,
            fractions: ProcessFractions::default(),
            ..KinematicInput::default()
        };
        assert_eq!(engine.evaluate(&input, &SystematicSelector::NOMINAL), 0.0);
    }

    #[test]
    fn wrong_vector_length_is_invalid_input() {
        let engine = sloped_engine();
        let err = engine.get_ff(&KIN[..9], "", "").unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FakeFactorEngine>();
    }
}
