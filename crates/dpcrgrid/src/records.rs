//! Output record rows and their tab-delimited table form.
//!
//! Circle tables have one row per circle: `x  y  radius  panel_index`.
//! Intensity tables have one row per well: `intensity  panel_index`.
//! `panel_index` is zero-based (image number minus one).

use std::io::{self, Write};

use crate::circle::Circle;
use crate::intensity::WellMeasurement;

/// One circle row.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CircleRecord {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub panel_index: usize,
}

impl CircleRecord {
    pub fn new(circle: &Circle, panel_index: usize) -> Self {
        Self {
            x: circle.x,
            y: circle.y,
            radius: circle.radius,
            panel_index,
        }
    }
}

/// One intensity row.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IntensityRecord {
    pub intensity: f64,
    pub panel_index: usize,
}

impl From<&WellMeasurement> for IntensityRecord {
    fn from(m: &WellMeasurement) -> Self {
        Self {
            intensity: m.intensity,
            panel_index: m.panel_index,
        }
    }
}

/// Write circle rows as a tab-delimited table.
pub fn write_circle_table<W: Write>(out: &mut W, rows: &[CircleRecord]) -> io::Result<()> {
    for r in rows {
        writeln!(out, "{}\t{}\t{}\t{}", r.x, r.y, r.radius, r.panel_index)?;
    }
    Ok(())
}

/// Write intensity rows as a tab-delimited table.
pub fn write_intensity_table<W: Write>(out: &mut W, rows: &[IntensityRecord]) -> io::Result<()> {
    for r in rows {
        writeln!(out, "{}\t{}", r.intensity, r.panel_index)?;
    }
    Ok(())
}

/// Read the intensity column back from a tab-delimited intensity table.
///
/// Blank lines are skipped; a malformed first column is an `InvalidData` error.
pub fn read_intensity_column(text: &str) -> io::Result<Vec<f64>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            let field = line.split('\t').next().unwrap_or("").trim();
            field.parse::<f64>().map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("row {}: invalid intensity '{}': {}", i + 1, field, e),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_table_layout() {
        let rows = [
            CircleRecord::new(&Circle::new(10.5, 20.0, 6.0).unwrap(), 0),
            CircleRecord::new(&Circle::new(35.0, 20.0, 6.0).unwrap(), 2),
        ];
        let mut buf = Vec::new();
        write_circle_table(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "10.5\t20\t6\t0\n35\t20\t6\t2\n");
    }

    #[test]
    fn intensity_table_reads_back() {
        let rows = [
            IntensityRecord {
                intensity: 0.25,
                panel_index: 0,
            },
            IntensityRecord {
                intensity: 0.875,
                panel_index: 1,
            },
        ];
        let mut buf = Vec::new();
        write_intensity_table(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "0.25\t0\n0.875\t1\n");
        assert_eq!(read_intensity_column(&text).unwrap(), vec![0.25, 0.875]);
    }

    #[test]
    fn malformed_intensity_row_is_rejected() {
        let err = read_intensity_column("0.1\t0\nabc\t0\n").expect_err("expected error");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("row 2"));
    }
}
