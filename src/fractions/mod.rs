//! Fake-fraction lookup.
//!
//! The process fractions of an event come from 2-D tables in (visible mass,
//! jet multiplicity), one table set per event category. Bins follow histogram
//! conventions: `edges[i] <= v < edges[i + 1]`, and anything outside the edges
//! reads as zero.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::ProcessFractions;
use crate::error::EngineError;

/// Event category used to pick the fraction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    ZeroJet,
    Boosted,
    Vbf,
}

impl Category {
    /// VBF needs at least two jets and a dijet mass above 300.
    pub fn classify(njets: f64, mjj: f64) -> Self {
        if njets == 0.0 {
            Category::ZeroJet
        } else if njets > 1.0 && mjj > 300.0 {
            Category::Vbf
        } else {
            Category::Boosted
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Category::ZeroJet => "0jet",
            Category::Boosted => "boosted",
            Category::Vbf => "vbf",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One category's tables as stored on disk. Contents are indexed `[x][y]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FractionTable {
    pub x_edges: Vec<f64>,
    pub y_edges: Vec<f64>,
    pub frac_w: Vec<Vec<f64>>,
    pub frac_tt: Vec<Vec<f64>>,
    pub frac_qcd: Vec<Vec<f64>>,
}

impl FractionTable {
    fn validate(&self, category: Category) -> Result<(), EngineError> {
        for (axis, edges) in [("x_edges", &self.x_edges), ("y_edges", &self.y_edges)] {
            if edges.len() < 2 {
                return Err(EngineError::config(format!(
                    "fraction table '{category}': {axis} needs at least two edges"
                )));
            }
            if edges.windows(2).any(|w| !(w[0] < w[1])) {
                return Err(EngineError::config(format!(
                    "fraction table '{category}': {axis} must be strictly increasing"
                )));
            }
        }
        let nx = self.x_edges.len() - 1;
        let ny = self.y_edges.len() - 1;
        for (name, contents) in [("frac_w", &self.frac_w), ("frac_tt", &self.frac_tt), ("frac_qcd", &self.frac_qcd)] {
            if contents.len() != nx || contents.iter().any(|row| row.len() != ny) {
                return Err(EngineError::config(format!(
                    "fraction table '{category}': {name} must be {nx}x{ny} to match its edges"
                )));
            }
        }
        Ok(())
    }

    pub fn lookup(&self, x: f64, y: f64) -> ProcessFractions {
        match (find_bin(&self.x_edges, x), find_bin(&self.y_edges, y)) {
            (Some(i), Some(j)) => ProcessFractions {
                tt: self.frac_tt[i][j],
                qcd: self.frac_qcd[i][j],
                w: self.frac_w[i][j],
            },
            _ => ProcessFractions::default(),
        }
    }
}

fn find_bin(edges: &[f64], value: f64) -> Option<usize> {
    let (first, last) = (*edges.first()?, *edges.last()?);
    if !(value >= first && value < last) {
        return None;
    }
    Some(edges.partition_point(|&e| e <= value) - 1)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FractionFile {
    pub categories: BTreeMap<String, FractionTable>,
}

/// Validated fraction tables for every category.
#[derive(Debug, Clone)]
pub struct FractionMap {
    tables: [FractionTable; 3],
}

impl FractionMap {
    pub fn from_file(mut file: FractionFile) -> Result<Self, EngineError> {
        let mut take = |category: Category| -> Result<FractionTable, EngineError> {
            let table = file
                .categories
                .remove(category.tag())
                .ok_or_else(|| EngineError::config(format!("fraction file has no '{category}' category")))?;
            table.validate(category)?;
            Ok(table)
        };
        let tables = [take(Category::ZeroJet)?, take(Category::Boosted)?, take(Category::Vbf)?];
        if !file.categories.is_empty() {
            let extra: Vec<&str> = file.categories.keys().map(String::as_str).collect();
            tracing::warn!("ignoring unknown fraction categories: {}", extra.join(", "));
        }
        Ok(Self { tables })
    }

    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let reader = File::open(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FractionFile = serde_json::from_reader(BufReader::new(reader)).map_err(|source| EngineError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("loaded fake fractions from {}", path.display());
        Self::from_file(file)
    }

    pub fn table(&self, category: Category) -> &FractionTable {
        match category {
            Category::ZeroJet => &self.tables[0],
            Category::Boosted => &self.tables[1],
            Category::Vbf => &self.tables[2],
        }
    }

    /// Fractions for an event.
    pub fn fractions(&self, visible_mass: f64, njets: f64, mjj: f64) -> ProcessFractions {
        self.table(Category::classify(njets, mjj)).lookup(visible_mass, njets)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Two mass bins × three jet bins; the W fraction encodes the bin and
    /// the category offset.
    pub(crate) fn table(offset: f64) -> FractionTable {
        let w = |i: usize, j: usize| offset + 0.1 * i as f64 + 0.01 * j as f64;
        FractionTable {
            x_edges: vec![0.0, 100.0, 400.0],
            y_edges: vec![0.0, 1.0, 2.0, 10.0],
            frac_w: (0..2).map(|i| (0..3).map(|j| w(i, j)).collect()).collect(),
            frac_tt: vec![vec![0.1; 3]; 2],
            frac_qcd: (0..2).map(|i| (0..3).map(|j| 0.9 - w(i, j)).collect()).collect(),
        }
    }

    pub(crate) fn sample_map() -> FractionMap {
        let categories = [("0jet", 0.0), ("boosted", 0.2), ("vbf", 0.4)]
            .into_iter()
            .map(|(name, offset)| (name.to_string(), table(offset)))
            .collect();
        FractionMap::from_file(FractionFile { categories }).unwrap()
    }

    #[test]
    fn categories() {
        assert_eq!(Category::classify(0.0, 500.0), Category::ZeroJet);
        assert_eq!(Category::classify(1.0, 500.0), Category::Boosted);
        assert_eq!(Category::classify(2.0, 300.0), Category::Boosted);
        assert_eq!(Category::classify(2.0, 301.0), Category::Vbf);
    }

    #[test]
    fn lookup_uses_category_and_bins() {
        let map = sample_map();
        let f = map.fractions(80.0, 0.0, 0.0);
        assert_eq!(f.w, 0.0);
        let f = map.fractions(150.0, 1.0, 0.0);
        assert!((f.w - (0.2 + 0.1 + 0.01)).abs() < 1e-12);
        let f = map.fractions(100.0, 3.0, 450.0);
        assert!((f.w - (0.4 + 0.1 + 0.02)).abs() < 1e-12);
        assert_eq!(f.tt, 0.1);
    }

    #[test]
    fn outside_edges_reads_zero() {
        let map = sample_map();
        assert_eq!(map.fractions(400.0, 0.0, 0.0), ProcessFractions::default());
        assert_eq!(map.fractions(-1.0, 1.0, 0.0), ProcessFractions::default());
        assert_eq!(map.fractions(f64::NAN, 1.0, 0.0), ProcessFractions::default());
    }

    #[test]
    fn shape_and_category_checks() {
        let mut bad = table(0.0);
        bad.frac_tt.pop();
        let categories = [("0jet", bad), ("boosted", table(0.0)), ("vbf", table(0.0))]
            .into_iter()
            .map(|(n, t)| (n.to_string(), t))
            .collect();
        let err = FractionMap::from_file(FractionFile { categories }).unwrap_err();
        assert!(err.to_string().contains("frac_tt"));

        let categories = [("0jet", table(0.0)), ("boosted", table(0.0))]
            .into_iter()
            .map(|(n, t)| (n.to_string(), t))
            .collect();
        let err = FractionMap::from_file(FractionFile { categories }).unwrap_err();
        assert!(err.to_string().contains("vbf"));
    }
}
