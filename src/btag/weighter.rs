//! b-tag veto weight.
//!
//! Events in the signal region veto b-tagged jets. For simulated events the
//! veto is applied as a weight from the data/simulation tag scale factors of
//! the (up to two) leading tag candidates; only the zero-tag row of the
//! tagging probability matrix is needed.

use crate::btag::fits::FitSet;
use crate::domain::{Direction, Flavor, TagCandidate, TagYear, WorkingPoint};
use crate::error::EngineError;

#[derive(Debug, Clone)]
pub struct VetoWeighter {
    year: TagYear,
    working_point: WorkingPoint,
    fits: &'static FitSet,
}

impl VetoWeighter {
    /// Fix the year and working point. 2017 uses the 2018 fits; other years
    /// are a configuration error.
    pub fn new(year: i32, working_point: WorkingPoint) -> Result<Self, EngineError> {
        let year = TagYear::from_year(year)?;
        Ok(Self {
            year,
            working_point,
            fits: FitSet::for_config(year, working_point),
        })
    }

    pub fn year(&self) -> TagYear {
        self.year
    }

    pub fn working_point(&self) -> WorkingPoint {
        self.working_point
    }

    /// Discriminant score a candidate must exceed to count as tagged.
    pub fn threshold(&self) -> f64 {
        self.fits.threshold
    }

    pub fn scale_factor(&self, pt: f64, flavor: Flavor, shift: Option<Direction>) -> f64 {
        self.fits.scale_factor(pt, flavor, shift)
    }

    fn is_tagged(&self, candidate: &TagCandidate) -> bool {
        candidate.pt > 0.0 && candidate.score > self.threshold()
    }

    /// Veto weight for two candidates. A candidate with non-positive pt is
    /// treated as absent.
    pub fn find_weight(&self, first: &TagCandidate, second: &TagCandidate, shift: Option<Direction>) -> f64 {
        let miss = |c: &TagCandidate| 1.0 - self.scale_factor(c.pt, c.flavor, shift);
        match (self.is_tagged(first), self.is_tagged(second)) {
            (true, true) => miss(first) * miss(second),
            (true, false) => miss(first),
            (false, true) => miss(second),
            (false, false) => 1.0,
        }
    }

    /// String boundary: flavour codes as numbers, shift as `"none"`, `"up"` or
    /// `"down"`. Any other shift string evaluates nominal.
    #[allow(clippy::too_many_arguments)]
    pub fn find_weight_str(
        &self,
        pt1: f64,
        flavor1: f64,
        score1: f64,
        pt2: f64,
        flavor2: f64,
        score2: f64,
        shift: &str,
    ) -> f64 {
        self.find_weight(
            &TagCandidate::new(pt1, flavor1, score1),
            &TagCandidate::new(pt2, flavor2, score2),
            Direction::parse(shift),
        )
    }
}
