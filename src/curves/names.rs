//! Curve naming convention.
//!
//! Curve names are the keys of the artifact files and must match them byte for
//! byte. Every name the engine can request is built here, and
//! `required_curves` enumerates them so a store can be validated up front.

use crate::domain::{Channel, Direction, JetBucket, Process, UncSource};

/// Lepton-pt closure bucket edges and labels for a channel.
///
/// Buckets are `(edges[0], edges[1]]`, `(edges[1], edges[2]]`, `(edges[2], ∞)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeptonPtBuckets {
    pub edges: [f64; 3],
    pub labels: [&'static str; 3],
}

impl LeptonPtBuckets {
    pub fn for_channel(channel: Channel) -> Self {
        match channel {
            Channel::MuTau => LeptonPtBuckets {
                edges: [30.0, 50.0, 70.0],
                labels: ["taupt30to50", "taupt50to70", "tauptgt70"],
            },
            Channel::ETau => LeptonPtBuckets {
                edges: [30.0, 40.0, 50.0],
                labels: ["taupt30to40", "taupt40to50", "tauptgt50"],
            },
        }
    }

    /// Index of the bucket containing `pt`, or `None` when `pt <= edges[0]` (or NaN).
    pub fn find(&self, pt: f64) -> Option<usize> {
        let [lo, mid, hi] = self.edges;
        if pt > lo && pt <= mid {
            Some(0)
        } else if pt > mid && pt <= hi {
            Some(1)
        } else if pt > hi {
            Some(2)
        } else {
            None
        }
    }
}

/// Nominal raw fake-factor curve.
pub fn raw_rate(channel: Channel, process: Process, jets: JetBucket) -> String {
    match process {
        Process::Tt => format!("mc_rawFF_{channel}_tt"),
        Process::W | Process::Qcd => format!("rawFF_{channel}_{}_{}", process.tag(), jets.tag()),
    }
}

/// Up/down variant of a raw fake-factor curve.
pub fn raw_rate_variant(
    channel: Channel,
    process: Process,
    jets: JetBucket,
    source: UncSource,
    direction: Direction,
) -> String {
    format!(
        "{}_{}_{}",
        raw_rate(channel, process, jets),
        source.tag(),
        direction.tag()
    )
}

/// Lepton-pt closure for one pt bucket, trigger family and process.
pub fn lepton_pt_closure(channel: Channel, bucket_label: &str, cross_trigger: bool, process: Process) -> String {
    let xtrg = if cross_trigger { "_xtrg" } else { "" };
    format!(
        "closure_lpt_{bucket_label}{xtrg}_{channel}_{}",
        process.closure_tag()
    )
}

/// Visible-mass closure (loaded with the closure artifact, consumed downstream).
pub fn visible_mass_closure(channel: Channel, process: Process, jets: JetBucket) -> String {
    match process {
        Process::Tt => format!("closure_mvis_{channel}_ttmc"),
        Process::W | Process::Qcd => format!("closure_mvis_{channel}_{}_{}", jets.tag(), process.tag()),
    }
}

/// QCD OS/SS closure in ΔR.
pub fn topo_closure(channel: Channel) -> String {
    format!("closure_OSSS_dr_flat_{channel}_qcd")
}

/// W transverse-mass closure, nominal when `variant` is `None`.
pub fn mt_closure(channel: Channel, variant: Option<(UncSource, Direction)>) -> String {
    match variant {
        None => format!("closure_mt_{channel}_w"),
        Some((source, direction)) => format!("closure_mt_{channel}_w_{}_{}", source.tag(), direction.tag()),
    }
}

/// Every curve the fake-factor engine can request for `channel`.
pub fn required_curves(channel: Channel) -> Vec<String> {
    let mut names = Vec::new();

    for process in Process::ALL {
        let buckets: &[JetBucket] = match process {
            Process::Tt => &[JetBucket::Zero],
            Process::W | Process::Qcd => &JetBucket::ALL,
        };
        for &jets in buckets {
            names.push(raw_rate(channel, process, jets));
            for source in UncSource::ALL {
                for direction in Direction::ALL {
                    names.push(raw_rate_variant(channel, process, jets, source, direction));
                }
            }
        }
    }

    let lpt = LeptonPtBuckets::for_channel(channel);
    for process in Process::ALL {
        for cross_trigger in [false, true] {
            for label in lpt.labels {
                names.push(lepton_pt_closure(channel, label, cross_trigger, process));
            }
        }
    }

    names.push(topo_closure(channel));
    names.push(mt_closure(channel, None));
    for source in UncSource::ALL {
        for direction in Direction::ALL {
            names.push(mt_closure(channel, Some((source, direction))));
        }
    }

    names
}

/// Visible-mass closures the closure artifact may carry for `channel`.
/// They are optional: the engine never requests them.
pub fn visible_mass_closures(channel: Channel) -> Vec<String> {
    let mut names = vec![visible_mass_closure(channel, Process::Tt, JetBucket::Zero)];
    for process in [Process::W, Process::Qcd] {
        for jets in JetBucket::ALL {
            names.push(visible_mass_closure(channel, process, jets));
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_artifact_keys() {
        let ch = Channel::MuTau;
        assert_eq!(raw_rate(ch, Process::Qcd, JetBucket::One), "rawFF_mt_qcd_1jet");
        assert_eq!(raw_rate(ch, Process::Tt, JetBucket::TwoPlus), "mc_rawFF_mt_tt");
        assert_eq!(
            raw_rate_variant(ch, Process::W, JetBucket::TwoPlus, UncSource::Unc2, Direction::Down),
            "rawFF_mt_w_2jet_unc2_down"
        );
        assert_eq!(
            raw_rate_variant(Channel::ETau, Process::Tt, JetBucket::Zero, UncSource::Unc1, Direction::Up),
            "mc_rawFF_et_tt_unc1_up"
        );
        assert_eq!(
            lepton_pt_closure(ch, "taupt50to70", true, Process::Tt),
            "closure_lpt_taupt50to70_xtrg_mt_ttmc"
        );
        assert_eq!(
            lepton_pt_closure(Channel::ETau, "tauptgt50", false, Process::W),
            "closure_lpt_tauptgt50_et_w"
        );
        assert_eq!(visible_mass_closure(ch, Process::Qcd, JetBucket::Zero), "closure_mvis_mt_0jet_qcd");
        assert_eq!(topo_closure(ch), "closure_OSSS_dr_flat_mt_qcd");
        assert_eq!(mt_closure(ch, None), "closure_mt_mt_w");
        assert_eq!(
            mt_closure(ch, Some((UncSource::Unc1, Direction::Up))),
            "closure_mt_mt_w_unc1_up"
        );
    }

    #[test]
    fn required_curve_count() {
        // raw: 7 (process, bucket) pairs × 5 = 35; lpt: 3 × 2 × 3 = 18; OSSS 1; mT 5.
        let names = required_curves(Channel::ETau);
        assert_eq!(names.len(), 59);
        let unique: std::collections::HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn visible_mass_closures_split_jets_except_ttbar() {
        let names = visible_mass_closures(Channel::MuTau);
        assert_eq!(names.len(), 7);
        assert_eq!(names[0], "closure_mvis_mt_ttmc");
        assert!(names.contains(&"closure_mvis_mt_2jet_w".to_string()));
        let required = required_curves(Channel::MuTau);
        assert!(names.iter().all(|n| !required.contains(n)));
    }

    #[test]
    fn lepton_pt_buckets_are_half_open() {
        let mt = LeptonPtBuckets::for_channel(Channel::MuTau);
        assert_eq!(mt.find(30.0), None);
        assert_eq!(mt.find(30.001), Some(0));
        assert_eq!(mt.find(50.0), Some(0));
        assert_eq!(mt.find(50.5), Some(1));
        assert_eq!(mt.find(70.0), Some(1));
        assert_eq!(mt.find(70.1), Some(2));
        assert_eq!(mt.find(f64::NAN), None);

        let et = LeptonPtBuckets::for_channel(Channel::ETau);
        assert_eq!(et.find(40.0), Some(0));
        assert_eq!(et.find(45.0), Some(1));
        assert_eq!(et.find(51.0), Some(2));
        assert_eq!(et.find(12.0), None);
    }
}
