use super::traits::{InputFileError, validate_input_path};
use crate::core::models::curve::{Curve, CurveKind};
use crate::core::utils::parse;
use std::f64::consts::PI;
use std::fmt::Write as _;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum GnomError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Input(#[from] InputFileError),
    #[error("P(R) data contains no 'R P(R) ERROR' rows")]
    EmptyDistribution,
    #[error("Fitted data contains no 'Q I_OBS ERROR I_CALC' rows")]
    EmptyFit,
    #[error("Expected a pair-distance curve, got a {0} curve")]
    WrongKind(CurveKind),
}

/// One row of a regularised fit: the measured point and the model through it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegularizedPoint {
    pub q: f64,
    pub observed: f64,
    pub error: f64,
    pub regularized: f64,
}

/// Reads a three-column P(R) table. Rows with a negative R are skipped; the
/// `R = 0` row is kept.
pub fn parse_pr_dat(text: &str) -> Curve {
    let mut curve = Curve::new(CurveKind::PairDistance);
    for [r, pr, error] in text.lines().filter_map(parse::float_row::<3>) {
        if r >= 0.0 {
            curve.push(r, pr, error);
        }
    }
    curve
}

/// Reads `Q I_OBS ERROR I_CALC` rows with a positive Q.
pub fn parse_regularized_fit(text: &str) -> Vec<RegularizedPoint> {
    text.lines()
        .filter_map(parse::float_row::<4>)
        .filter(|[q, ..]| *q > 0.0)
        .map(|[q, observed, error, regularized]| RegularizedPoint {
            q,
            observed,
            error,
            regularized,
        })
        .collect()
}

fn read_dat_text(path: &Path) -> Result<String, GnomError> {
    validate_input_path(path, &["dat"])?;
    Ok(std::fs::read_to_string(path)?)
}

/// A GNOM-style output assembled from a P(R) table and the fit it came from.
///
/// Programs that stop short of writing GNOM output leave these two tables as
/// separate DAT files; joining them gives an `.out` file that dummy-atom
/// modelling programs accept.
#[derive(Debug, Clone, PartialEq)]
pub struct GnomOutput {
    pub title: String,
    pub fit: Vec<RegularizedPoint>,
    pub distribution: Curve,
}

impl GnomOutput {
    pub fn new(
        title: impl Into<String>,
        distribution: Curve,
        fit: Vec<RegularizedPoint>,
    ) -> Result<Self, GnomError> {
        if distribution.kind() != CurveKind::PairDistance {
            return Err(GnomError::WrongKind(distribution.kind()));
        }
        if distribution.is_empty() {
            return Err(GnomError::EmptyDistribution);
        }
        if fit.is_empty() {
            return Err(GnomError::EmptyFit);
        }
        Ok(Self {
            title: title.into(),
            fit,
            distribution,
        })
    }

    /// Builds the output from a P(R) DAT file and a four-column fit DAT file.
    pub fn from_dat_paths(pr_path: &Path, fit_path: &Path) -> Result<Self, GnomError> {
        let distribution = parse_pr_dat(&read_dat_text(pr_path)?);
        info!("Parsed P(R) data with {} points", distribution.len());
        let fit = parse_regularized_fit(&read_dat_text(fit_path)?);
        info!("Parsed fitted data with {} points", fit.len());
        let title = pr_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(title, distribution, fit)
    }

    /// Real-space Rg and I(0) of the distribution by trapezoidal integration.
    ///
    /// `Rg^2 = int(r^2 P) / (2 int(P))` and `I(0) = 4 pi int(P)`.
    pub fn real_space_estimates(&self) -> Option<(f64, f64)> {
        let r = self.distribution.axis();
        let p = self.distribution.values();
        let mut zeroth = 0.0;
        let mut second = 0.0;
        for i in 1..r.len() {
            let dr = r[i] - r[i - 1];
            zeroth += 0.5 * (p[i] + p[i - 1]) * dr;
            second += 0.5 * (r[i] * r[i] * p[i] + r[i - 1] * r[i - 1] * p[i - 1]) * dr;
        }
        if zeroth <= 0.0 || second < 0.0 {
            return None;
        }
        Some(((second / (2.0 * zeroth)).sqrt(), 4.0 * PI * zeroth))
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "           ####    G N O M   ---   Version 4.5a revised 09/02/02     ####"
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "           ===    Run No   1   ===");
        let _ = writeln!(out, " Run title:  {}", self.title);
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "   Number of points omitted at the beginning:           0"
        );
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "      S          J EXP       ERROR       J REG       I REG"
        );
        let _ = writeln!(out);
        for point in &self.fit {
            let _ = writeln!(
                out,
                " {:>12.4E} {:>12.4E} {:>12.4E} {:>12.4E} {:>12.4E}",
                point.q, point.observed, point.error, point.regularized, point.regularized
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "          Distance distribution  function of particle");
        let _ = writeln!(out);
        let _ = writeln!(out, "       R          P(R)      ERROR");
        let _ = writeln!(out);
        for (r, pr, error) in self.distribution.rows() {
            let _ = writeln!(out, " {:>12.4E} {:>12.4E} {:>12.4E}", r, pr, error);
        }
        let _ = writeln!(out);
        if let Some((rg, i0)) = self.real_space_estimates() {
            let _ = writeln!(
                out,
                "          Reciprocal space: Rg = {:>8.2}     , I(0) = {:>12.4E}",
                rg, i0
            );
        }
        out
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), GnomError> {
        std::fs::write(path, self.render())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::curve::OutFile;
    use crate::core::io::traits::RecordFile;
    use std::fs;
    use tempfile::tempdir;

    fn triangle() -> Curve {
        parse_pr_dat("R P(R) ERROR\n0.0 0.0 0.0\n10.0 1.0 0.1\n20.0 0.0 0.1\n")
    }

    fn fit() -> Vec<RegularizedPoint> {
        parse_regularized_fit("q I_OBS E I_CALC\n0.01 100.0 2.0 99.0\n0.02 80.0 1.5 81.0\n")
    }

    #[test]
    fn pr_parse_keeps_the_origin_row() {
        let curve = triangle();
        assert_eq!(curve.axis(), &[0.0, 10.0, 20.0]);
        assert_eq!(curve.dmax(), Some(20.0));
    }

    #[test]
    fn fit_parse_requires_four_numeric_columns() {
        let rows = parse_regularized_fit("0.01 1.0 0.1\n0.02 2.0 0.1 1.9\n-0.1 1.0 0.1 1.0\n");
        assert_eq!(
            rows,
            vec![RegularizedPoint {
                q: 0.02,
                observed: 2.0,
                error: 0.1,
                regularized: 1.9
            }]
        );
    }

    #[test]
    fn real_space_estimates_integrate_the_distribution() {
        let output = GnomOutput::new("triangle", triangle(), fit()).unwrap();
        let (rg, i0) = output.real_space_estimates().unwrap();
        assert!((rg - 50f64.sqrt()).abs() < 1e-12);
        assert!((i0 - 40.0 * PI).abs() < 1e-9);
    }

    #[test]
    fn rendered_output_reads_back_as_an_out_file() {
        let output = GnomOutput::new("triangle", triangle(), fit()).unwrap();
        let text = output.render();

        assert!(text.contains(" Run title:  triangle"));
        assert!(text.contains("Reciprocal space: Rg =     7.07"));
        let distribution = OutFile::parse(&text).unwrap();
        assert_eq!(distribution.axis(), &[10.0, 20.0]);
        assert_eq!(distribution.values(), &[1.0, 0.0]);
        assert_eq!(distribution.dmax(), Some(20.0));
    }

    #[test]
    fn new_rejects_empty_tables_and_wrong_kinds() {
        assert!(matches!(
            GnomOutput::new("x", Curve::new(CurveKind::PairDistance), fit()),
            Err(GnomError::EmptyDistribution)
        ));
        assert!(matches!(
            GnomOutput::new("x", triangle(), Vec::new()),
            Err(GnomError::EmptyFit)
        ));
        assert!(matches!(
            GnomOutput::new("x", Curve::new(CurveKind::Intensity), fit()),
            Err(GnomError::WrongKind(CurveKind::Intensity))
        ));
    }

    #[test]
    fn from_dat_paths_joins_both_files() {
        let dir = tempdir().unwrap();
        let pr = dir.path().join("bsa_pr.dat");
        let data = dir.path().join("bsa_sx.dat");
        fs::write(&pr, "0.0 0.0 0.0\n10.0 1.0 0.1\n20.0 0.0 0.1\n").unwrap();
        fs::write(&data, "0.01 100.0 2.0 99.0\n").unwrap();

        let output = GnomOutput::from_dat_paths(&pr, &data).unwrap();

        assert_eq!(output.title, "bsa_pr");
        assert_eq!(output.fit.len(), 1);
        let out_path = dir.path().join("bsa.out");
        output.write_to_path(&out_path).unwrap();
        assert_eq!(OutFile::read_from_path(&out_path).unwrap().len(), 2);
    }
}
