//! Formatted terminal output for the `ff` commands.

use crate::app::pipeline::ApplyOutput;
use crate::curves::names::visible_mass_closures;
use crate::curves::{ArtifactKind, CorrectionCurve, CurveStore};
use crate::ff::ProcessFactors;

/// Channel, curve counts, then every curve grouped by artifact.
pub fn format_store_summary(store: &CurveStore) -> String {
    let mut out = String::new();
    out.push_str("=== ff - curve store ===\n");
    out.push_str(&format!("Channel: {}\n", store.channel()));
    out.push_str(&format!("Curves: {}\n", store.len()));
    let mvis = visible_mass_closures(store.channel());
    let present = mvis.iter().filter(|name| store.contains(name)).count();
    out.push_str(&format!("Visible-mass closures: {present}/{}\n", mvis.len()));

    let groups = ArtifactKind::ALL.map(Some).into_iter().chain([None]);
    for origin in groups {
        let curves: Vec<&CorrectionCurve> = store
            .curves()
            .filter(|(_, o)| *o == origin)
            .map(|(c, _)| c)
            .collect();
        if curves.is_empty() {
            continue;
        }
        let label = origin.map_or("in-memory", ArtifactKind::label);
        out.push_str(&format!("\n{label} ({}):\n", curves.len()));
        for curve in curves {
            out.push_str(&format!("  {:<40} {:<12}{}\n", curve.name(), curve.form().kind(), fmt_range(curve.range()))
                .trim_end());
            out.push('\n');
        }
    }
    out
}

/// One evaluated weight with its per-process breakdown.
pub fn format_eval(weight: f64, factors: &ProcessFactors) -> String {
    format!(
        "fake_weight = {weight:.6}\n  ff_tt  = {:.6}\n  ff_qcd = {:.6}\n  ff_w   = {:.6}\n",
        factors.tt, factors.qcd, factors.w
    )
}

/// Row counts, skipped rows, nominal weight range and the mean relative shift
/// of every systematic column.
pub fn format_apply_summary(output: &ApplyOutput) -> String {
    let mut out = String::new();
    let table = &output.table;

    out.push_str("=== ff - apply ===\n");
    out.push_str(&format!("Rows: read={} | used={} | skipped={}\n", table.rows_read, table.rows_used(), table.row_errors.len()));
    for err in table.row_errors.iter().take(10) {
        out.push_str(&format!("  line {}: {}\n", err.line, err.message));
    }
    if table.row_errors.len() > 10 {
        out.push_str(&format!("  ... {} more\n", table.row_errors.len() - 10));
    }

    let nominal: Vec<f64> = output.weights.iter().map(|w| w.nominal).collect();
    if let Some((min, mean, max)) = min_mean_max(&nominal) {
        out.push_str(&format!("fake_weight: min={min:.6} mean={mean:.6} max={max:.6}\n"));
    }

    if !output.columns.is_empty() {
        out.push_str("\nMean relative shift:\n");
        for (i, selector) in output.columns.iter().enumerate() {
            let ratios: Vec<f64> = output
                .weights
                .iter()
                .filter(|w| w.nominal != 0.0)
                .map(|w| w.shifted[i] / w.nominal - 1.0)
                .collect();
            let shown = match min_mean_max(&ratios) {
                Some((_, mean, _)) => format!("{:+.4}%", mean * 100.0),
                None => "n/a".to_string(),
            };
            out.push_str(&format!("  {:<28} {shown}\n", selector.column_name()));
        }
    }
    out
}

fn fmt_range(range: Option<(f64, f64)>) -> String {
    match range {
        Some((lo, hi)) => format!("[{lo}, {hi}]"),
        None => String::new(),
    }
}

fn min_mean_max(values: &[f64]) -> Option<(f64, f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some((min, mean, max))
}
