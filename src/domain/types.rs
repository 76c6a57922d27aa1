//! Shared domain types.
//!
//! These are the typed forms of everything that crosses the engine boundary:
//! channel and process tags, the per-event kinematic vector, systematic
//! selectors, and the b-tag candidates fed to the veto weighter. String
//! identifiers (`"mt"`, `"ff_w_0jet_unc1"`, `"up"`, ...) are parsed into these
//! types once, at the edge, and never compared again inside the engine.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Detection channel. Selects curve names and lepton-pt bucket edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Channel {
    /// μτ channel: lepton-pt closure buckets (30,50], (50,70], (70,∞).
    #[serde(rename = "mt")]
    #[value(name = "mt")]
    MuTau,
    /// eτ channel: lepton-pt closure buckets (30,40], (40,50], (50,∞).
    #[serde(rename = "et")]
    #[value(name = "et")]
    ETau,
}

impl Channel {
    /// Tag used inside curve names.
    pub fn tag(self) -> &'static str {
        match self {
            Channel::MuTau => "mt",
            Channel::ETau => "et",
        }
    }

    /// Column holding the light-lepton pt in event tables.
    pub fn lepton_pt_column(self) -> &'static str {
        match self {
            Channel::MuTau => "mu_pt",
            Channel::ETau => "el_pt",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Channel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mt" => Ok(Channel::MuTau),
            "et" => Ok(Channel::ETau),
            other => Err(EngineError::config(format!(
                "unknown channel '{other}' (expected 'mt' or 'et')"
            ))),
        }
    }
}

/// Background process contributing jet→τ fakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Process {
    Tt,
    W,
    Qcd,
}

impl Process {
    pub const ALL: [Process; 3] = [Process::Tt, Process::W, Process::Qcd];

    /// Tag used in raw-rate curve names and systematic keys.
    pub fn tag(self) -> &'static str {
        match self {
            Process::Tt => "tt",
            Process::W => "w",
            Process::Qcd => "qcd",
        }
    }

    /// Tag used in closure curve names (TT closures come from simulation).
    pub fn closure_tag(self) -> &'static str {
        match self {
            Process::Tt => "ttmc",
            Process::W => "w",
            Process::Qcd => "qcd",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Process::Tt => 0,
            Process::W => 1,
            Process::Qcd => 2,
        }
    }
}

/// Jet multiplicity bucket: 0, 1, ≥2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JetBucket {
    Zero,
    One,
    TwoPlus,
}

impl JetBucket {
    pub const ALL: [JetBucket; 3] = [JetBucket::Zero, JetBucket::One, JetBucket::TwoPlus];

    /// Bucket a jet count. Anything that is neither exactly 0 nor exactly 1
    /// (including NaN) lands in `TwoPlus`.
    pub fn from_count(njets: f64) -> Self {
        if njets == 0.0 {
            JetBucket::Zero
        } else if njets == 1.0 {
            JetBucket::One
        } else {
            JetBucket::TwoPlus
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            JetBucket::Zero => "0jet",
            JetBucket::One => "1jet",
            JetBucket::TwoPlus => "2jet",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            JetBucket::Zero => 0,
            JetBucket::One => 1,
            JetBucket::TwoPlus => 2,
        }
    }
}

/// Systematic shift direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Up, Direction::Down];

    /// Parse `"up"` / `"down"`; anything else (including `""` and `"none"`) is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            _ => None,
        }
    }

    /// Direction of a fake-factor systematic: `"up"` is up, every other
    /// string (including `""` and `"none"`) is down.
    pub fn from_shift(s: &str) -> Self {
        if s == "up" { Direction::Up } else { Direction::Down }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// Fixed ±10% scaling used by the lepton-pt and ΔR closure systematics.
    pub fn flat_scale(self) -> f64 {
        match self {
            Direction::Up => 1.1,
            Direction::Down => 0.9,
        }
    }
}

/// Which of the two fitted uncertainty curve pairs to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UncSource {
    Unc1,
    Unc2,
}

impl UncSource {
    pub const ALL: [UncSource; 2] = [UncSource::Unc1, UncSource::Unc2];

    pub fn tag(self) -> &'static str {
        match self {
            UncSource::Unc1 => "unc1",
            UncSource::Unc2 => "unc2",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            UncSource::Unc1 => 0,
            UncSource::Unc2 => 1,
        }
    }
}

/// A named systematic variation of the fake factor.
///
/// The string keys (`ff_qcd_1jet_unc2`, `lptclosure_w`, ...) are the names used
/// by downstream template producers; `parse` / `key` convert at that boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Systematic {
    Nominal,
    /// Replace the raw rate curve of one (process, jet bucket) by its fitted
    /// up/down variant. TT carries no jet split and only exists as `Zero`.
    RawRate {
        process: Process,
        jets: JetBucket,
        source: UncSource,
    },
    /// Scale the lepton-pt closure of one process by ±10%.
    LeptonPtClosure(Process),
    /// Replace the W transverse-mass closure by a fitted up/down variant.
    MtClosure(UncSource),
    /// Scale the QCD ΔR (OS/SS) closure by ±10%.
    TopoClosure,
}

impl Systematic {
    /// Parse a systematic key. The empty string is `Nominal`; unknown keys are `None`.
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "" => return Some(Systematic::Nominal),
            "lptclosure_tt" => return Some(Systematic::LeptonPtClosure(Process::Tt)),
            "lptclosure_w" => return Some(Systematic::LeptonPtClosure(Process::W)),
            "lptclosure_qcd" => return Some(Systematic::LeptonPtClosure(Process::Qcd)),
            "mtclosure_w_unc1" => return Some(Systematic::MtClosure(UncSource::Unc1)),
            "mtclosure_w_unc2" => return Some(Systematic::MtClosure(UncSource::Unc2)),
            "osssclosure_qcd" => return Some(Systematic::TopoClosure),
            _ => {}
        }

        // ff_<process>_<bucket>_<unc>
        let rest = key.strip_prefix("ff_")?;
        let mut parts = rest.split('_');
        let process = match parts.next()? {
            "tt" => Process::Tt,
            "w" => Process::W,
            "qcd" => Process::Qcd,
            _ => return None,
        };
        let jets = match parts.next()? {
            "0jet" => JetBucket::Zero,
            "1jet" => JetBucket::One,
            "2jet" => JetBucket::TwoPlus,
            _ => return None,
        };
        let source = match parts.next()? {
            "unc1" => UncSource::Unc1,
            "unc2" => UncSource::Unc2,
            _ => return None,
        };
        if parts.next().is_some() || (process == Process::Tt && jets != JetBucket::Zero) {
            return None;
        }
        Some(Systematic::RawRate { process, jets, source })
    }

    /// The string key of this systematic (`""` for nominal).
    pub fn key(&self) -> String {
        match *self {
            Systematic::Nominal => String::new(),
            Systematic::RawRate { process, jets, source } => {
                format!("ff_{}_{}_{}", process.tag(), jets.tag(), source.tag())
            }
            Systematic::LeptonPtClosure(process) => format!("lptclosure_{}", process.tag()),
            Systematic::MtClosure(source) => format!("mtclosure_w_{}", source.tag()),
            Systematic::TopoClosure => "osssclosure_qcd".to_string(),
        }
    }

    /// Every non-nominal variation, in the order used for output columns.
    pub fn catalogue() -> Vec<Systematic> {
        let mut out = Vec::with_capacity(20);
        for process in [Process::Qcd, Process::W] {
            for jets in JetBucket::ALL {
                for source in UncSource::ALL {
                    out.push(Systematic::RawRate { process, jets, source });
                }
            }
        }
        for source in UncSource::ALL {
            out.push(Systematic::RawRate {
                process: Process::Tt,
                jets: JetBucket::Zero,
                source,
            });
        }
        for source in UncSource::ALL {
            out.push(Systematic::MtClosure(source));
        }
        for process in [Process::Qcd, Process::W, Process::Tt] {
            out.push(Systematic::LeptonPtClosure(process));
        }
        out.push(Systematic::TopoClosure);
        out
    }
}

impl fmt::Display for Systematic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Systematic::Nominal => f.write_str("nominal"),
            other => f.write_str(&other.key()),
        }
    }
}

/// A systematic together with its direction.
///
/// `direction` is only meaningful when `systematic` is not `Nominal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystematicSelector {
    pub systematic: Systematic,
    pub direction: Direction,
}

impl SystematicSelector {
    pub const NOMINAL: SystematicSelector = SystematicSelector {
        systematic: Systematic::Nominal,
        direction: Direction::Up,
    };

    pub fn new(systematic: Systematic, direction: Direction) -> Self {
        Self { systematic, direction }
    }

    /// Build a selector from the string pair used by callers.
    ///
    /// An empty or unknown key evaluates as nominal. For a known key, any
    /// direction other than `"up"` selects the down variation.
    pub fn from_strings(key: &str, direction: &str) -> Self {
        let Some(systematic) = Systematic::parse(key) else {
            tracing::debug!(key, "unknown systematic key, evaluating nominal");
            return Self::NOMINAL;
        };
        if systematic == Systematic::Nominal {
            return Self::NOMINAL;
        }
        Self {
            systematic,
            direction: Direction::from_shift(direction),
        }
    }

    pub fn is_nominal(&self) -> bool {
        self.systematic == Systematic::Nominal
    }

    /// Output column name, e.g. `ff_w_0jet_unc1_up` (`fake_weight` for nominal).
    pub fn column_name(&self) -> String {
        if self.is_nominal() {
            return "fake_weight".to_string();
        }
        format!("{}_{}", self.systematic.key(), self.direction.tag())
    }
}

impl Default for SystematicSelector {
    fn default() -> Self {
        Self::NOMINAL
    }
}

/// Event-level process fractions. Expected (not enforced) to sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessFractions {
    pub tt: f64,
    pub qcd: f64,
    pub w: f64,
}

/// Per-event kinematic inputs of the fake-factor engine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KinematicInput {
    /// τ candidate transverse momentum.
    pub pt: f64,
    /// Transverse mass of lepton + MET.
    pub transverse_mass: f64,
    pub visible_mass: f64,
    /// Light-lepton transverse momentum.
    pub lepton_pt: f64,
    /// ΔR between the lepton and the τ candidate.
    pub distance: f64,
    pub missing_et: f64,
    pub jet_multiplicity: f64,
    pub cross_trigger: bool,
    pub fractions: ProcessFractions,
}

impl KinematicInput {
    /// Number of entries in the ordered vector form.
    pub const LEN: usize = 11;

    /// Build from the ordered vector
    /// `[pt, mt, mvis, lpt, dr, met, njets, xtrg, frac_tt, frac_qcd, frac_w]`.
    pub fn from_slice(kin: &[f64]) -> Result<Self, EngineError> {
        let [pt, transverse_mass, visible_mass, lepton_pt, distance, missing_et, jet_multiplicity, xtrg, tt, qcd, w] =
            *kin
        else {
            return Err(EngineError::InvalidInput(format!(
                "kinematic vector must have {} entries, got {}",
                Self::LEN,
                kin.len()
            )));
        };
        Ok(Self {
            pt,
            transverse_mass,
            visible_mass,
            lepton_pt,
            distance,
            missing_et,
            jet_multiplicity,
            cross_trigger: xtrg != 0.0,
            fractions: ProcessFractions { tt, qcd, w },
        })
    }

    /// Inverse of `from_slice`.
    pub fn to_array(&self) -> [f64; 11] {
        [
            self.pt,
            self.transverse_mass,
            self.visible_mass,
            self.lepton_pt,
            self.distance,
            self.missing_et,
            self.jet_multiplicity,
            if self.cross_trigger { 1.0 } else { 0.0 },
            self.fractions.tt,
            self.fractions.qcd,
            self.fractions.w,
        ]
    }

    pub fn jet_bucket(&self) -> JetBucket {
        JetBucket::from_count(self.jet_multiplicity)
    }
}

/// Jet flavour from the generator-level hadron flavour code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    Bottom,
    Charm,
    Light,
}

impl Flavor {
    /// 5 ⇒ b, 4 ⇒ c, anything else ⇒ light.
    pub fn from_code(code: f64) -> Self {
        if code == 5.0 {
            Flavor::Bottom
        } else if code == 4.0 {
            Flavor::Charm
        } else {
            Flavor::Light
        }
    }
}

/// One b-tag candidate jet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TagCandidate {
    pub pt: f64,
    pub flavor: Flavor,
    /// b-tag discriminant score.
    pub score: f64,
}

impl TagCandidate {
    pub fn new(pt: f64, flavor_code: f64, score: f64) -> Self {
        Self {
            pt,
            flavor: Flavor::from_code(flavor_code),
            score,
        }
    }
}

/// Data-taking era for the b-tag scale factors. 2017 shares the 2018 fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagYear {
    Y2016,
    Y2018,
}

impl TagYear {
    pub fn from_year(year: i32) -> Result<Self, EngineError> {
        match year {
            2016 => Ok(TagYear::Y2016),
            2017 | 2018 => Ok(TagYear::Y2018),
            other => Err(EngineError::config(format!(
                "no b-tag scale factors for year {other} (expected 2016, 2017 or 2018)"
            ))),
        }
    }
}

/// b-tag working point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WorkingPoint {
    Loose,
    Medium,
}

impl FromStr for WorkingPoint {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loose" => Ok(WorkingPoint::Loose),
            "medium" => Ok(WorkingPoint::Medium),
            other => Err(EngineError::config(format!(
                "working point must be 'loose' or 'medium', got '{other}'"
            ))),
        }
    }
}
