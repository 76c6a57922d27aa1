//! The curve registry.
//!
//! A `CurveStore` owns every correction curve for one channel. It is built
//! once, validated eagerly (every curve the engine can request must be
//! present), and read-only afterwards. Evaluators resolve the names they need
//! into `CurveHandle`s at construction, so per-event evaluation never builds
//! or hashes strings.

use std::collections::HashMap;

use crate::curves::artifacts::{ArtifactKind, ArtifactPaths, read_curve_file};
use crate::curves::curve::CorrectionCurve;
use crate::curves::names::required_curves;
use crate::domain::Channel;
use crate::error::EngineError;

/// Index of a curve inside a `CurveStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurveHandle(usize);

#[derive(Debug, Clone)]
struct Entry {
    curve: CorrectionCurve,
    origin: Option<ArtifactKind>,
}

/// Immutable, string-keyed registry of correction curves.
#[derive(Debug, Clone)]
pub struct CurveStore {
    channel: Channel,
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl CurveStore {
    /// Load all four artifacts for `channel` and validate the result.
    pub fn load(channel: Channel, paths: &ArtifactPaths) -> Result<Self, EngineError> {
        let mut builder = Builder::new(channel);
        for kind in ArtifactKind::ALL {
            let path = paths.get(kind);
            tracing::info!("loading {} from {}", kind.label(), path.display());
            let file = read_curve_file(path).map_err(|err| match err {
                EngineError::Io { path, source } => EngineError::config(format!(
                    "cannot open {} artifact '{}': {source}",
                    kind.label(),
                    path.display()
                )),
                other => other,
            })?;
            let curves = file.into_curves()?;
            tracing::debug!(count = curves.len(), "read curves from {}", path.display());
            for curve in curves {
                builder.insert(curve, Some(kind))?;
            }
        }
        let store = builder.finish()?;
        tracing::info!(channel = %channel, curves = store.len(), "curve store ready");
        Ok(store)
    }

    /// Build a store from in-memory curves, with the same validation as `load`.
    pub fn from_curves(channel: Channel, curves: impl IntoIterator<Item = CorrectionCurve>) -> Result<Self, EngineError> {
        let mut builder = Builder::new(channel);
        for curve in curves {
            builder.insert(curve, None)?;
        }
        builder.finish()
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Resolve a curve name to a handle.
    pub fn handle(&self, name: &str) -> Result<CurveHandle, EngineError> {
        self.index
            .get(name)
            .map(|&i| CurveHandle(i))
            .ok_or_else(|| EngineError::CurveNotFound(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&CorrectionCurve> {
        self.index.get(name).map(|&i| &self.entries[i].curve)
    }

    /// Evaluate a curve by name.
    pub fn evaluate(&self, name: &str, x: f64) -> Result<f64, EngineError> {
        let handle = self.handle(name)?;
        Ok(self.eval(handle, x))
    }

    /// Evaluate a curve by handle.
    ///
    /// Handles are only valid for the store that issued them.
    pub fn eval(&self, handle: CurveHandle, x: f64) -> f64 {
        self.entries[handle.0].curve.evaluate(x)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.curve.name())
    }

    /// Curves in insertion order, with the artifact they came from.
    pub fn curves(&self) -> impl Iterator<Item = (&CorrectionCurve, Option<ArtifactKind>)> {
        self.entries.iter().map(|e| (&e.curve, e.origin))
    }
}

struct Builder {
    channel: Channel,
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl Builder {
    fn new(channel: Channel) -> Self {
        Self {
            channel,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn insert(&mut self, curve: CorrectionCurve, origin: Option<ArtifactKind>) -> Result<(), EngineError> {
        if self.index.contains_key(curve.name()) {
            return Err(EngineError::config(format!(
                "curve '{}' is defined more than once",
                curve.name()
            )));
        }
        self.index.insert(curve.name().to_string(), self.entries.len());
        self.entries.push(Entry { curve, origin });
        Ok(())
    }

    fn finish(self) -> Result<CurveStore, EngineError> {
        let missing: Vec<String> = required_curves(self.channel)
            .into_iter()
            .filter(|name| !self.index.contains_key(name))
            .collect();
        if !missing.is_empty() {
            let shown = missing.iter().take(5).cloned().collect::<Vec<_>>().join(", ");
            let more = if missing.len() > 5 {
                format!(" (+{} more)", missing.len() - 5)
            } else {
                String::new()
            };
            return Err(EngineError::config(format!(
                "{} required curve(s) missing for channel {}: {shown}{more}",
                missing.len(),
                self.channel
            )));
        }
        Ok(CurveStore {
            channel: self.channel,
            entries: self.entries,
            index: self.index,
        })
    }
}
