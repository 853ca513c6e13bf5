use super::traits::{InputFileError, validate_input_path};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum AutorgError {
    #[error(transparent)]
    Input(#[from] InputFileError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("autorg report contains no 'Rg = ...' line")]
    MissingRg,
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
}

/// A value with its reported standard deviation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub value: f64,
    pub error: Option<f64>,
}

/// The text report printed by `autorg FILE`.
#[derive(Debug, Clone, PartialEq)]
pub struct AutorgReport {
    pub rg: Estimate,
    pub i0: Option<Estimate>,
    /// First and last point of the Guinier range, 1-based as printed.
    pub points: Option<(usize, usize)>,
    /// Fit quality in percent.
    pub quality: Option<f64>,
}

impl AutorgReport {
    pub fn parse(text: &str) -> Result<Self, AutorgError> {
        let mut rg = None;
        let mut i0 = None;
        let mut points = None;
        let mut quality = None;

        for line in text.lines() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.first().copied() {
                Some("Rg") => rg = parse_estimate(&tokens),
                Some("I(0)") => i0 = parse_estimate(&tokens),
                Some("Points") => {
                    // "Points 12 to 48"
                    let first = tokens.get(1).and_then(|t| t.parse().ok());
                    let last = tokens.get(3).and_then(|t| t.parse().ok());
                    points = first.zip(last);
                }
                Some("Quality:") => {
                    quality = tokens
                        .get(1)
                        .and_then(|t| t.trim_end_matches('%').parse().ok());
                }
                _ => debug!("Ignoring autorg line '{}'", line),
            }
        }

        Ok(Self {
            rg: rg.ok_or(AutorgError::MissingRg)?,
            i0,
            points,
            quality,
        })
    }

    /// Index of the first point inside the Guinier range, 0-based.
    pub fn first_good_index(&self) -> Option<usize> {
        self.points.map(|(first, _)| first.saturating_sub(1))
    }
}

/// Reads `NAME = value +/- error`.
fn parse_estimate(tokens: &[&str]) -> Option<Estimate> {
    let value = tokens.get(2)?.parse().ok()?;
    let error = match tokens.get(3) {
        Some(&"+/-") => tokens.get(4).and_then(|t| t.parse().ok()),
        _ => None,
    };
    Some(Estimate { value, error })
}

/// One row of `autorg -f csv` output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AutorgCsvRow {
    pub file: String,
    pub rg: f64,
    pub rg_error: f64,
    pub i0: f64,
    pub i0_error: f64,
    pub first_point: usize,
    pub last_point: usize,
    /// Quality as printed, possibly with a trailing `%`.
    pub quality: String,
    pub aggregated: String,
}

impl AutorgCsvRow {
    pub fn quality_percent(&self) -> Option<f64> {
        self.quality.trim_end_matches('%').trim().parse().ok()
    }
}

/// Reads autorg CSV rows; a leading header row is detected and skipped.
pub fn read_autorg_csv(text: &str) -> Result<Vec<AutorgCsvRow>, AutorgError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let numeric_rg = record.get(1).is_some_and(|rg| rg.parse::<f64>().is_ok());
        if index == 0 && !numeric_rg {
            debug!("Skipping autorg CSV header row");
            continue;
        }
        rows.push(record.deserialize(None)?);
    }
    if rows.is_empty() {
        warn!("autorg CSV contained no data rows");
    }
    Ok(rows)
}

pub fn read_autorg_csv_path<P: AsRef<Path>>(path: P) -> Result<Vec<AutorgCsvRow>, AutorgError> {
    let path = path.as_ref();
    validate_input_path(path, &["csv"])?;
    let text = std::fs::read_to_string(path)?;
    read_autorg_csv(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
Rg   =  31.42 +/- 0.12 (0.4%)
I(0) =  1.234e+02 +/- 5.6e-01
Points   12 to 48 (37 total)
Quality: 87%
Aggregated: 0.0
";

    #[test]
    fn report_parse_reads_every_field() {
        let report = AutorgReport::parse(REPORT).unwrap();
        assert_eq!(
            report.rg,
            Estimate {
                value: 31.42,
                error: Some(0.12)
            }
        );
        assert_eq!(report.i0.unwrap().value, 123.4);
        assert_eq!(report.points, Some((12, 48)));
        assert_eq!(report.first_good_index(), Some(11));
        assert_eq!(report.quality, Some(87.0));
    }

    #[test]
    fn report_parse_fails_without_rg() {
        let result = AutorgReport::parse("Quality: 10%\n");
        assert!(matches!(result, Err(AutorgError::MissingRg)));
    }

    #[test]
    fn csv_reader_skips_header_row() {
        let text = "File,Rg,Rg StDev,I(0),I(0) StDev,First point,Last point,Quality,Aggregated\n\
                    bsa.dat, 29.8, 0.2, 1520.0, 4.1, 14, 60, 89%, 0.0\n";
        let rows = read_autorg_csv(text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].file, "bsa.dat");
        assert_eq!(rows[0].rg, 29.8);
        assert_eq!(rows[0].first_point, 14);
        assert_eq!(rows[0].quality_percent(), Some(89.0));
    }

    #[test]
    fn csv_reader_accepts_headerless_input() {
        let rows = read_autorg_csv("lys.dat,15.1,0.3,80.0,1.0,5,40,0.75,0\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].last_point, 40);
    }

    #[test]
    fn csv_reader_reports_malformed_rows() {
        let result = read_autorg_csv("a.dat,15.1,0.3,oops,1.0,5,40,0.75,0\n");
        assert!(matches!(result, Err(AutorgError::Csv(_))));
    }
}
