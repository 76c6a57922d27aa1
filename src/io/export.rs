//! Export per-event weights to CSV.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::app::pipeline::EventWeights;
use crate::domain::SystematicSelector;
use crate::error::EngineError;

/// Write one row per event: the source line, the nominal weight, then one
/// column per shifted selector in `columns` order.
pub fn write_weights_csv(path: &Path, columns: &[SystematicSelector], weights: &[EventWeights]) -> Result<(), EngineError> {
    let io_err = |source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut out = BufWriter::new(File::create(path).map_err(io_err)?);

    write!(out, "line,fake_weight").map_err(io_err)?;
    for selector in columns {
        write!(out, ",{}", selector.column_name()).map_err(io_err)?;
    }
    writeln!(out).map_err(io_err)?;

    for w in weights {
        write!(out, "{},{:.10}", w.line, w.nominal).map_err(io_err)?;
        for value in &w.shifted {
            write!(out, ",{value:.10}").map_err(io_err)?;
        }
        writeln!(out).map_err(io_err)?;
    }
    out.flush().map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, Systematic};
    use tempfile::tempdir;

    #[test]
    fn writes_header_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("weights.csv");
        let columns = [
            SystematicSelector::new(Systematic::TopoClosure, Direction::Up),
            SystematicSelector::new(Systematic::TopoClosure, Direction::Down),
        ];
        let weights = [
            EventWeights {
                line: 2,
                nominal: 0.5,
                shifted: vec![0.55, 0.45],
            },
            EventWeights {
                line: 4,
                nominal: 1.25,
                shifted: vec![1.3, 1.2],
            },
        ];
        write_weights_csv(&path, &columns, &weights).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "line,fake_weight,osssclosure_qcd_up,osssclosure_qcd_down");
        assert_eq!(lines[1], "2,0.5000000000,0.5500000000,0.4500000000");
        assert!(lines[2].starts_with("4,1.2500000000,"));
        assert_eq!(lines.len(), 3);
    }
}
