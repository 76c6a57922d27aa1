//! Read/write curve artifact files.
//!
//! Curves are shipped as four JSON artifacts per channel:
//! - raw fake factors (`uncorrected_fakefactors_<ch>.json`)
//! - lepton-pt / visible-mass closures (`FF_corrections_1.json`)
//! - OS/SS and transverse-mass closures (`FF_QCDcorrectionOSSS.json`)
//! - τ-pt corrections (`tauptcorrection_<ch>.json`)
//!
//! The schema is `CurveFile`: a map from curve name to `CurveSpec`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::curves::curve::{CorrectionCurve, CurveForm};
use crate::domain::Channel;
use crate::error::EngineError;

/// Environment variable naming the artifact directory.
pub const ARTIFACT_DIR_ENV: &str = "FF_ARTIFACT_DIR";

/// The four logical artifacts a curve store is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    RawRates,
    Closures,
    OsssClosures,
    TauPtCorrections,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::RawRates,
        ArtifactKind::Closures,
        ArtifactKind::OsssClosures,
        ArtifactKind::TauPtCorrections,
    ];

    /// Conventional file name inside an artifact directory.
    pub fn file_name(self, channel: Channel) -> String {
        match self {
            ArtifactKind::RawRates => format!("uncorrected_fakefactors_{channel}.json"),
            ArtifactKind::Closures => "FF_corrections_1.json".to_string(),
            ArtifactKind::OsssClosures => "FF_QCDcorrectionOSSS.json".to_string(),
            ArtifactKind::TauPtCorrections => format!("tauptcorrection_{channel}.json"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ArtifactKind::RawRates => "raw rates",
            ArtifactKind::Closures => "closures",
            ArtifactKind::OsssClosures => "OS/SS + mT closures",
            ArtifactKind::TauPtCorrections => "tau-pt corrections",
        }
    }
}

/// Locations of the four artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub raw_rates: PathBuf,
    pub closures: PathBuf,
    pub osss_closures: PathBuf,
    pub tau_pt_corrections: PathBuf,
}

impl ArtifactPaths {
    /// Standard file names inside `dir`.
    pub fn in_dir(dir: &Path, channel: Channel) -> Self {
        Self {
            raw_rates: dir.join(ArtifactKind::RawRates.file_name(channel)),
            closures: dir.join(ArtifactKind::Closures.file_name(channel)),
            osss_closures: dir.join(ArtifactKind::OsssClosures.file_name(channel)),
            tau_pt_corrections: dir.join(ArtifactKind::TauPtCorrections.file_name(channel)),
        }
    }

    /// Resolve the artifact directory from `FF_ARTIFACT_DIR` (a `.env` file is honored).
    pub fn dir_from_env() -> Result<PathBuf, EngineError> {
        dotenvy::dotenv().ok();
        std::env::var_os(ARTIFACT_DIR_ENV)
            .map(PathBuf::from)
            .ok_or_else(|| {
                EngineError::config(format!(
                    "no artifact directory given and {ARTIFACT_DIR_ENV} is not set (.env)"
                ))
            })
    }

    pub fn get(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::RawRates => &self.raw_rates,
            ArtifactKind::Closures => &self.closures,
            ArtifactKind::OsssClosures => &self.osss_closures,
            ArtifactKind::TauPtCorrections => &self.tau_pt_corrections,
        }
    }
}

/// One curve entry in an artifact file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSpec {
    #[serde(flatten)]
    pub form: CurveForm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<(f64, f64)>,
}

impl CurveSpec {
    pub fn into_curve(self, name: &str) -> Result<CorrectionCurve, EngineError> {
        CorrectionCurve::new(name, self.form, self.range)
    }
}

impl From<&CorrectionCurve> for CurveSpec {
    fn from(curve: &CorrectionCurve) -> Self {
        CurveSpec {
            form: curve.form().clone(),
            range: curve.range(),
        }
    }
}

/// A curve artifact file (JSON).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurveFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// Date the curves were derived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produced: Option<NaiveDate>,
    pub curves: BTreeMap<String, CurveSpec>,
}

impl CurveFile {
    /// Convert every entry into a validated curve, in name order.
    pub fn into_curves(self) -> Result<Vec<CorrectionCurve>, EngineError> {
        self.curves
            .into_iter()
            .map(|(name, spec)| spec.into_curve(&name))
            .collect()
    }
}

/// Read a curve artifact file.
pub fn read_curve_file(path: &Path) -> Result<CurveFile, EngineError> {
    let file = File::open(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| EngineError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a curve artifact file.
pub fn write_curve_file(path: &Path, curves: &CurveFile) -> Result<(), EngineError> {
    let file = File::create(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_writer_pretty(file, curves).map_err(|source| EngineError::Json {
        path: path.to_path_buf(),
        source,
    })
}
