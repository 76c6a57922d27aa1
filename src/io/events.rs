//! Event-table ingest.
//!
//! Reads one CSV row per event and turns it into a `KinematicInput`. Rows that
//! cannot be used are skipped and recorded; the table as a whole only fails
//! when the schema is wrong or nothing usable is left.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{Channel, KinematicInput, ProcessFractions};
use crate::error::EngineError;
use crate::fractions::FractionMap;

const FRACTION_COLUMNS: [&str; 3] = ["frac_tt", "frac_qcd", "frac_w"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// One usable event and the CSV line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub line: usize,
    pub input: KinematicInput,
}

#[derive(Debug, Clone)]
pub struct EventTable {
    pub events: Vec<Event>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl EventTable {
    pub fn rows_used(&self) -> usize {
        self.events.len()
    }
}

/// Load events for `channel`. Fractions are taken from the `frac_*` columns
/// when a row has all three, otherwise from `fractions`.
pub fn load_events(path: &Path, channel: Channel, fractions: Option<&FractionMap>) -> Result<EventTable, EngineError> {
    let file = File::open(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| EngineError::config(format!("failed to read CSV headers of '{}': {e}", path.display())))?
        .clone();
    let header_map = build_header_map(&headers);

    let columns = Columns::for_channel(channel);
    let missing: Vec<&str> = columns
        .required()
        .into_iter()
        .filter(|name| !header_map.contains_key(*name))
        .collect();
    if !missing.is_empty() {
        return Err(EngineError::config(format!(
            "'{}' is missing required column(s): {}",
            path.display(),
            missing.join(", ")
        )));
    }
    let has_fraction_columns = FRACTION_COLUMNS.iter().all(|c| header_map.contains_key(*c));
    if !has_fraction_columns && fractions.is_none() {
        return Err(EngineError::config(format!(
            "'{}' has no frac_tt/frac_qcd/frac_w columns; a fraction map is required",
            path.display()
        )));
    }

    let mut events = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // header is line 1
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, &header_map, &columns, fractions));
        match parsed {
            Ok(input) => events.push(Event { line, input }),
            Err(message) => {
                tracing::warn!(line, "skipping row: {message}");
                row_errors.push(RowError { line, message });
            }
        }
    }

    if events.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "no usable events in '{}' ({rows_read} row(s) read, {} rejected)",
            path.display(),
            row_errors.len()
        )));
    }

    Ok(EventTable {
        events,
        row_errors,
        rows_read,
    })
}

struct Columns {
    lepton_pt: &'static str,
}

impl Columns {
    fn for_channel(channel: Channel) -> Self {
        Self {
            lepton_pt: channel.lepton_pt_column(),
        }
    }

    fn required(&self) -> [&'static str; 8] {
        ["t1_pt", "mt", "vis_mass", self.lepton_pt, "lep_dr", "met", "njets", "cross_trigger"]
    }
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    columns: &Columns,
    fractions: Option<&FractionMap>,
) -> Result<KinematicInput, String> {
    let num = |name: &str| parse_f64(get_required(record, header_map, name)?, name);

    let pt = num("t1_pt")?;
    let transverse_mass = num("mt")?;
    let visible_mass = num("vis_mass")?;
    let lepton_pt = num(columns.lepton_pt)?;
    let distance = num("lep_dr")?;
    let missing_et = num("met")?;
    let jet_multiplicity = num("njets")?;
    let cross_trigger = num("cross_trigger")? != 0.0;

    let mjj = match get_optional(record, header_map, "mjj") {
        Some(s) => parse_f64(s, "mjj")?,
        None => 0.0,
    };

    let from_columns = FRACTION_COLUMNS.map(|name| get_optional(record, header_map, name));
    let fractions = match from_columns {
        [Some(tt), Some(qcd), Some(w)] => ProcessFractions {
            tt: parse_f64(tt, "frac_tt")?,
            qcd: parse_f64(qcd, "frac_qcd")?,
            w: parse_f64(w, "frac_w")?,
        },
        _ => match fractions {
            Some(map) => map.fractions(visible_mass, jet_multiplicity, mjj),
            None => return Err("row has no fractions and no fraction map was given".to_string()),
        },
    };

    Ok(KinematicInput {
        pt,
        transverse_mass,
        visible_mass,
        lepton_pt,
        distance,
        missing_et,
        jet_multiplicity,
        cross_trigger,
        fractions,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // strip a UTF-8 BOM on the first header
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn get_required<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("missing required column `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing value for `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_f64(s: &str, name: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("`{name}` is not a number: '{s}'"))?;
    if !v.is_finite() {
        return Err(format!("`{name}` is not finite: '{s}'"));
    }
    Ok(v)
}
