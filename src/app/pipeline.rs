//! The batch workflow behind `ff apply`:
//! event CSV -> per-event nominal + shifted weights -> optional CSV export.

use std::path::PathBuf;

use rayon::prelude::*;

use crate::domain::{Direction, Systematic, SystematicSelector};
use crate::error::EngineError;
use crate::ff::FakeFactorEngine;
use crate::fractions::FractionMap;
use crate::io::events::{EventTable, load_events};

/// Inputs of one `apply` run.
#[derive(Debug, Clone)]
pub struct ApplyConfig {
    pub events: PathBuf,
    pub fractions: Option<PathBuf>,
    pub systematics: bool,
    pub output: Option<PathBuf>,
}

/// Weights for one event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventWeights {
    /// CSV line of the source row.
    pub line: usize,
    pub nominal: f64,
    /// One entry per column of `ApplyOutput::columns`.
    pub shifted: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct ApplyOutput {
    pub table: EventTable,
    pub columns: Vec<SystematicSelector>,
    pub weights: Vec<EventWeights>,
}

/// Every catalogue systematic, up then down.
pub fn shifted_columns() -> Vec<SystematicSelector> {
    Systematic::catalogue()
        .into_iter()
        .flat_map(|s| Direction::ALL.map(|d| SystematicSelector::new(s, d)))
        .collect()
}

/// Evaluate every event in parallel. Output order equals input order.
pub fn evaluate_events(engine: &FakeFactorEngine, table: &EventTable, columns: &[SystematicSelector]) -> Vec<EventWeights> {
    table
        .events
        .par_iter()
        .map(|event| EventWeights {
            line: event.line,
            nominal: engine.evaluate(&event.input, &SystematicSelector::NOMINAL),
            shifted: columns.iter().map(|sel| engine.evaluate(&event.input, sel)).collect(),
        })
        .collect()
}

pub fn run_apply(engine: &FakeFactorEngine, config: &ApplyConfig) -> Result<ApplyOutput, EngineError> {
    let fractions = config.fractions.as_deref().map(FractionMap::load).transpose()?;
    let table = load_events(&config.events, engine.channel(), fractions.as_ref())?;
    tracing::info!(
        rows_read = table.rows_read,
        rows_used = table.rows_used(),
        "loaded events from {}",
        config.events.display()
    );

    let columns = if config.systematics { shifted_columns() } else { Vec::new() };
    let weights = evaluate_events(engine, &table, &columns);
    tracing::info!(events = weights.len(), shifts = columns.len(), "evaluated fake factors");

    if let Some(path) = &config.output {
        crate::io::export::write_weights_csv(path, &columns, &weights)?;
        tracing::info!("wrote weights to {}", path.display());
    }

    Ok(ApplyOutput {
        table,
        columns,
        weights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::store::tests::constant_store;
    use crate::domain::{Channel, KinematicInput};
    use crate::io::events::Event;

    #[test]
    fn forty_shifted_columns() {
        let columns = shifted_columns();
        assert_eq!(columns.len(), 40);
        assert_eq!(columns[0].column_name(), "ff_qcd_0jet_unc1_up");
        assert_eq!(columns[1].column_name(), "ff_qcd_0jet_unc1_down");
        assert_eq!(columns[39].column_name(), "osssclosure_qcd_down");
    }

    #[test]
    fn parallel_evaluation_keeps_order() {
        let engine = FakeFactorEngine::new(constant_store(Channel::MuTau, 2.0)).unwrap();
        let events = (0..200)
            .map(|i| {
                let w = f64::from(i) / 200.0;
                let kin = [45.0, 30.0, 80.0, 40.0, 1.5, 20.0, 0.0, 0.0, 1.0 - w, 0.0, w];
                Event {
                    line: i as usize + 2,
                    input: KinematicInput::from_slice(&kin).unwrap(),
                }
            })
            .collect();
        let table = EventTable {
            events,
            row_errors: Vec::new(),
            rows_read: 200,
        };
        let columns = shifted_columns();
        let weights = evaluate_events(&engine, &table, &columns);
        assert_eq!(weights.len(), 200);
        for (i, w) in weights.iter().enumerate() {
            assert_eq!(w.line, i + 2);
            let frac_w = i as f64 / 200.0;
            let expected = (1.0 - frac_w) * 4.0 + frac_w * 8.0;
            assert!((w.nominal - expected).abs() < 1e-12);
            assert_eq!(w.shifted.len(), 40);
        }
    }
}
