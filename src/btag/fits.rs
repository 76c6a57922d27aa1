//! Closed-form b-tag scale-factor fits per (year, working point).
//!
//! Heavy flavour (b and c) share one nominal curve; their up/down variations
//! add a per-pt-bucket constant, with a separate table for c jets. Light jets
//! use a cubic nominal multiplied by `1 ± u(pt)` for the variations.

use crate::domain::{Direction, Flavor, TagYear, WorkingPoint};

/// Upper edges of the heavy-flavour uncertainty buckets. A pt at or above the
/// last edge gets no shift.
pub const HEAVY_PT_EDGES: [f64; 9] = [30.0, 50.0, 70.0, 100.0, 140.0, 200.0, 300.0, 600.0, 1000.0];

/// Nominal heavy-flavour scale factor as a function of jet pt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeavyNominal {
    /// `scale * (1 + num * x) / (1 + den * x)`
    Rational { scale: f64, num: f64, den: f64 },
    /// `offset + scale * ln(x + 19) * ln(x + 18) * (3 - slope * ln(x + 18))`
    Logarithmic { offset: f64, scale: f64, slope: f64 },
}

impl HeavyNominal {
    pub fn evaluate(&self, x: f64) -> f64 {
        match *self {
            HeavyNominal::Rational { scale, num, den } => scale * ((1.0 + num * x) / (1.0 + den * x)),
            HeavyNominal::Logarithmic { offset, scale, slope } => {
                let l18 = (x + 18.0).ln();
                offset + scale * ((x + 19.0).ln() * (l18 * (3.0 - slope * l18)))
            }
        }
    }
}

/// Scale-factor parameterisation for one (year, working point).
#[derive(Debug, Clone, PartialEq)]
pub struct FitSet {
    pub threshold: f64,
    pub heavy: HeavyNominal,
    pub b_shifts: [f64; 9],
    pub c_shifts: [f64; 9],
    /// Cubic coefficients, ascending order.
    pub light: [f64; 4],
    /// Quadratic relative uncertainty, ascending order.
    pub light_unc: [f64; 3],
}

impl FitSet {
    pub fn for_config(year: TagYear, working_point: WorkingPoint) -> &'static FitSet {
        match (year, working_point) {
            (TagYear::Y2016, WorkingPoint::Loose) => &LOOSE_2016,
            (TagYear::Y2018, WorkingPoint::Loose) => &LOOSE_2018,
            (TagYear::Y2016, WorkingPoint::Medium) => &MEDIUM_2016,
            (TagYear::Y2018, WorkingPoint::Medium) => &MEDIUM_2018,
        }
    }

    /// Additive heavy-flavour shift magnitude at `pt` (0 for pt ≥ 1000 or light jets).
    pub fn heavy_shift(&self, pt: f64, flavor: Flavor) -> f64 {
        let table = match flavor {
            Flavor::Bottom => &self.b_shifts,
            Flavor::Charm => &self.c_shifts,
            Flavor::Light => return 0.0,
        };
        HEAVY_PT_EDGES
            .iter()
            .position(|&edge| pt < edge)
            .map_or(0.0, |i| table[i])
    }

    pub fn scale_factor(&self, pt: f64, flavor: Flavor, shift: Option<Direction>) -> f64 {
        match flavor {
            Flavor::Bottom | Flavor::Charm => {
                let nominal = self.heavy.evaluate(pt);
                match shift {
                    None => nominal,
                    Some(Direction::Up) => nominal + self.heavy_shift(pt, flavor),
                    Some(Direction::Down) => nominal - self.heavy_shift(pt, flavor),
                }
            }
            Flavor::Light => {
                let [c0, c1, c2, c3] = self.light;
                let nominal = c0 + c1 * pt + c2 * pt * pt + c3 * pt * pt * pt;
                let [u0, u1, u2] = self.light_unc;
                let unc = u0 + u1 * pt + u2 * pt * pt;
                match shift {
                    None => nominal,
                    Some(Direction::Up) => nominal * (1.0 + unc),
                    Some(Direction::Down) => nominal * (1.0 - unc),
                }
            }
        }
    }
}

static LOOSE_2016: FitSet = FitSet {
    threshold: 0.2217,
    heavy: HeavyNominal::Rational {
        scale: 0.933791,
        num: 0.0115268,
        den: 0.0103699,
    },
    b_shifts: [
        0.039079215377569199,
        0.014356007799506187,
        0.012236535549163818,
        0.011882896535098553,
        0.011785224080085754,
        0.012215510942041874,
        0.014544816687703133,
        0.026683652773499489,
        0.055047694593667984,
    ],
    c_shifts: [
        0.097698040306568146,
        0.035890020430088043,
        0.030591338872909546,
        0.029707241803407669,
        0.029463060200214386,
        0.030538776889443398,
        0.036362040787935257,
        0.066709131002426147,
        0.13761924207210541,
    ],
    light: [1.06337, -0.000276004, 1.25504e-06, -8.9312e-10],
    light_unc: [0.0421943, 5.30087e-05, -6.87049e-08],
};

static LOOSE_2018: FitSet = FitSet {
    threshold: 0.1241,
    heavy: HeavyNominal::Logarithmic {
        offset: 0.917829,
        scale: 0.00298278,
        slope: 0.422392,
    },
    b_shifts: [
        0.062023099511861801,
        0.013962121680378914,
        0.013880428858101368,
        0.013638468459248543,
        0.011050660163164139,
        0.011366868391633034,
        0.011010468937456608,
        0.037737511098384857,
        0.069150865077972412,
    ],
    c_shifts: [
        0.15505774319171906,
        0.03490530326962471,
        0.034701071679592133,
        0.034096170216798782,
        0.027626650407910347,
        0.02841717004776001,
        0.027526171877980232,
        0.094343781471252441,
        0.17287716269493103,
    ],
    light: [1.41852, -0.00040383, 2.89389e-07, -3.55101e-11],
    light_unc: [0.0559259, 1.96455e-05, -3.60571e-08],
};

static MEDIUM_2016: FitSet = FitSet {
    threshold: 0.6321,
    heavy: HeavyNominal::Rational {
        scale: 0.653526,
        num: 0.220245,
        den: 0.14383,
    },
    b_shifts: [
        0.043795019388198853,
        0.015845479443669319,
        0.014174085110425949,
        0.013200919143855572,
        0.012912030331790447,
        0.019475525245070457,
        0.01628459244966507,
        0.034840557724237442,
        0.049875054508447647,
    ],
    c_shifts: [
        0.13138505816459656,
        0.047536440193653107,
        0.042522255331277847,
        0.039602756500244141,
        0.038736090064048767,
        0.058426573872566223,
        0.048853777348995209,
        0.10452167689800262,
        0.14962516725063324,
    ],
    light: [1.09286, -0.00052597, 1.88225e-06, -1.27417e-09],
    light_unc: [0.101915, 0.000192134, -1.94974e-07],
};

static MEDIUM_2018: FitSet = FitSet {
    threshold: 0.4184,
    heavy: HeavyNominal::Logarithmic {
        offset: 0.909339,
        scale: 0.00354,
        slope: 0.471623,
    },
    b_shifts: [
        0.065904870629310608,
        0.015055687166750431,
        0.013506759889423847,
        0.015106724575161934,
        0.014620178379118443,
        0.012161554768681526,
        0.016239689663052559,
        0.039990410208702087,
        0.068454340100288391,
    ],
    c_shifts: [
        0.19771461188793182,
        0.045167062431573868,
        0.040520280599594116,
        0.045320175588130951,
        0.043860536068677902,
        0.036484666168689728,
        0.048719070851802826,
        0.11997123062610626,
        0.20536302030086517,
    ],
    light: [1.6329, -0.00160255, 1.9899e-06, -6.72613e-10],
    light_unc: [0.122811, 0.000162564, -1.66422e-07],
};

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CONFIGS: [(TagYear, WorkingPoint); 4] = [
        (TagYear::Y2016, WorkingPoint::Loose),
        (TagYear::Y2018, WorkingPoint::Loose),
        (TagYear::Y2016, WorkingPoint::Medium),
        (TagYear::Y2018, WorkingPoint::Medium),
    ];

    #[test]
    fn charm_shifts_exceed_bottom_shifts_everywhere() {
        for (year, wp) in CONFIGS {
            let fits = FitSet::for_config(year, wp);
            for (b, c) in fits.b_shifts.iter().zip(&fits.c_shifts) {
                assert!(c > b, "{year:?} {wp:?}: c shift {c} <= b shift {b}");
            }
        }
    }

    #[test]
    fn shift_bucket_lookup() {
        let fits = FitSet::for_config(TagYear::Y2016, WorkingPoint::Loose);
        assert_relative_eq!(fits.heavy_shift(40.0, Flavor::Bottom), 0.014356007799506187);
        assert_relative_eq!(fits.heavy_shift(40.0, Flavor::Charm), 0.035890020430088043);
        assert_relative_eq!(fits.heavy_shift(20.0, Flavor::Bottom), 0.039079215377569199);
        // edges belong to the next bucket
        assert_relative_eq!(fits.heavy_shift(50.0, Flavor::Bottom), 0.012236535549163818);
        assert_relative_eq!(fits.heavy_shift(999.0, Flavor::Charm), 0.13761924207210541);
        assert_eq!(fits.heavy_shift(1000.0, Flavor::Bottom), 0.0);
        assert_eq!(fits.heavy_shift(40.0, Flavor::Light), 0.0);
    }

    #[test]
    fn heavy_nominal_forms() {
        let rational = FitSet::for_config(TagYear::Y2016, WorkingPoint::Loose).heavy;
        let x = 40.0;
        assert_relative_eq!(
            rational.evaluate(x),
            0.933791 * ((1.0 + 0.0115268 * x) / (1.0 + 0.0103699 * x))
        );
        let log = FitSet::for_config(TagYear::Y2018, WorkingPoint::Medium).heavy;
        let expected =
            0.909339 + 0.00354 * ((x + 19.0).ln() * ((x + 18.0).ln() * (3.0 - 0.471623 * (x + 18.0).ln())));
        assert_relative_eq!(log.evaluate(x), expected);
    }

    #[test]
    fn thresholds() {
        let t = |year, wp| FitSet::for_config(year, wp).threshold;
        assert_eq!(t(TagYear::Y2016, WorkingPoint::Loose), 0.2217);
        assert_eq!(t(TagYear::Y2018, WorkingPoint::Loose), 0.1241);
        assert_eq!(t(TagYear::Y2016, WorkingPoint::Medium), 0.6321);
        assert_eq!(t(TagYear::Y2018, WorkingPoint::Medium), 0.4184);
    }
}
