use super::traits::{InputFileError, RecordFile};
use crate::core::models::curve::{Curve, CurveKind};
use crate::core::utils::parse;
use std::io::{self, BufRead, Read, Write};
use thiserror::Error;
use tracing::{debug, info};

/// Marker line that bounds the P(R) section of a GNOM output file from below.
const RECIPROCAL_SPACE_MARKER: &str = "Reciprocal space: Rg =";

#[derive(Debug, Error)]
pub enum CurveError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Input(#[from] InputFileError),
    #[error("No 'R  P(R)  ERROR' section header found in OUT data")]
    SectionNotFound,
}

/// Parses whitespace-delimited rows into a curve of the given kind.
///
/// A row is kept only when its first three tokens are numbers and it passes
/// the positivity filter for `kind`. Everything else is skipped.
pub fn parse_rows<'a>(kind: CurveKind, lines: impl IntoIterator<Item = &'a str>) -> Curve {
    let mut curve = Curve::new(kind);
    let mut skipped = 0usize;
    for line in lines {
        match parse::float_row::<3>(line) {
            Some([axis, value, third]) if accepts(kind, axis, value) => {
                curve.push(axis, value, third)
            }
            _ => skipped += 1,
        }
    }
    debug!(
        "Parsed {} {} rows, skipped {}",
        curve.len(),
        kind,
        skipped
    );
    curve
}

fn accepts(kind: CurveKind, axis: f64, value: f64) -> bool {
    match kind {
        CurveKind::Fit => axis > 0.0 && value > 0.0,
        CurveKind::Intensity | CurveKind::PairDistance => axis > 0.0,
    }
}

/// Renders a curve as a titled, left-justified fixed-width table.
///
/// Intensity and fit rows with a non-positive Q are not emitted.
pub fn render(curve: &Curve) -> String {
    let [a, b, c] = curve.kind().titles();
    let mut out = format!("{a:<15} {b:<18} {c:<15}\n");
    for (axis, value, third) in curve.rows() {
        if curve.kind() != CurveKind::PairDistance && axis <= 0.0 {
            continue;
        }
        out.push_str(&format!(
            "{:<15} {:<18} {:<15}\n",
            axis.to_string(),
            value.to_string(),
            third.to_string()
        ));
    }
    out
}

fn read_text(reader: &mut impl BufRead) -> io::Result<String> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(text)
}

fn write_curve(curve: &Curve, writer: &mut impl Write) -> Result<(), CurveError> {
    writer.write_all(render(curve).as_bytes())?;
    Ok(())
}

/// Scattering curve file (`Q I E`).
pub struct DatFile;

impl DatFile {
    pub fn parse(text: &str) -> Curve {
        parse_rows(CurveKind::Intensity, text.lines())
    }
}

impl RecordFile for DatFile {
    type Data = Curve;
    type Error = CurveError;

    const EXTENSIONS: &'static [&'static str] = &["dat"];

    fn read_from(reader: &mut impl BufRead) -> Result<Curve, CurveError> {
        let curve = Self::parse(&read_text(reader)?);
        info!("Read DAT curve with {} data points", curve.len());
        Ok(curve)
    }

    fn write_to(curve: &Curve, writer: &mut impl Write) -> Result<(), CurveError> {
        write_curve(curve, writer)
    }
}

/// Model fit file (`Q observed model`), as written by crysol, foxs and friends.
pub struct FitFile;

impl FitFile {
    pub fn parse(text: &str) -> Curve {
        parse_rows(CurveKind::Fit, text.lines())
    }
}

impl RecordFile for FitFile {
    type Data = Curve;
    type Error = CurveError;

    const EXTENSIONS: &'static [&'static str] = &["fit", "fir"];

    fn read_from(reader: &mut impl BufRead) -> Result<Curve, CurveError> {
        let curve = Self::parse(&read_text(reader)?);
        info!("Read FIT curve with {} data points", curve.len());
        Ok(curve)
    }

    fn write_to(curve: &Curve, writer: &mut impl Write) -> Result<(), CurveError> {
        write_curve(curve, writer)
    }
}

/// GNOM output file; only the real-space P(R) section is read.
pub struct OutFile;

impl OutFile {
    /// Extracts the P(R) table following the last `R  P(R)  ERROR` header.
    ///
    /// Rows stop at the `Reciprocal space: Rg =` marker when one follows the
    /// header.
    pub fn parse(text: &str) -> Result<Curve, CurveError> {
        let lines: Vec<&str> = text.lines().collect();
        let header = lines
            .iter()
            .rposition(|line| is_section_header(line))
            .ok_or(CurveError::SectionNotFound)?;

        let section = lines[header + 1..]
            .iter()
            .take_while(|line| !line.contains(RECIPROCAL_SPACE_MARKER))
            .copied();
        Ok(parse_rows(CurveKind::PairDistance, section))
    }
}

fn is_section_header(line: &str) -> bool {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    tokens
        .windows(3)
        .any(|w| w == ["R", "P(R)", "ERROR"])
}

impl RecordFile for OutFile {
    type Data = Curve;
    type Error = CurveError;

    const EXTENSIONS: &'static [&'static str] = &["out"];

    fn read_from(reader: &mut impl BufRead) -> Result<Curve, CurveError> {
        let curve = Self::parse(&read_text(reader)?)?;
        info!("Read P(R) with {} bins", curve.len());
        Ok(curve)
    }

    fn write_to(curve: &Curve, writer: &mut impl Write) -> Result<(), CurveError> {
        write_curve(curve, writer)
    }
}

/// Which intensity column of a Crysol profile to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntColumn {
    /// Scattering in solution (second column).
    #[default]
    Solution,
    /// Scattering in vacuum (third column).
    Vacuum,
}

/// A Crysol `.int` profile: Q with solution and vacuum intensities.
///
/// Rows are kept from `Q = 0` upward so the forward scattering stays available.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntProfile {
    pub q: Vec<f64>,
    pub solution: Vec<f64>,
    pub vacuum: Vec<f64>,
}

impl IntProfile {
    fn column(&self, column: IntColumn) -> &[f64] {
        match column {
            IntColumn::Solution => &self.solution,
            IntColumn::Vacuum => &self.vacuum,
        }
    }

    /// Intensity of the `Q = 0` row, if the profile has one.
    pub fn i_zero(&self, column: IntColumn) -> Option<f64> {
        self.q
            .iter()
            .position(|&q| q == 0.0)
            .map(|i| self.column(column)[i])
    }

    /// The profile as a scattering curve restricted to `q_min < Q < q_max`.
    ///
    /// `background` is added to every intensity. Errors are zero since the
    /// profile is computed, not measured.
    pub fn to_curve(&self, column: IntColumn, background: f64, q_min: f64, q_max: f64) -> Curve {
        let mut curve = Curve::new(CurveKind::Intensity);
        for (&q, &intensity) in self.q.iter().zip(self.column(column)) {
            if q > q_min && q < q_max {
                curve.push(q, intensity + background, 0.0);
            }
        }
        curve
    }
}

/// Crysol intensity profile file (`Q I(sol) I(vac) ...`).
pub struct IntFile;

impl IntFile {
    /// Reads every row whose first three tokens are numbers and whose Q is not
    /// negative. The title line and any further columns are ignored.
    pub fn parse(text: &str) -> IntProfile {
        let mut profile = IntProfile::default();
        for line in text.lines() {
            if let Some([q, solution, vacuum]) = parse::float_row::<3>(line) {
                if q >= 0.0 {
                    profile.q.push(q);
                    profile.solution.push(solution);
                    profile.vacuum.push(vacuum);
                }
            }
        }
        profile
    }
}

impl RecordFile for IntFile {
    type Data = IntProfile;
    type Error = CurveError;

    const EXTENSIONS: &'static [&'static str] = &["int"];

    fn read_from(reader: &mut impl BufRead) -> Result<IntProfile, CurveError> {
        let profile = Self::parse(&read_text(reader)?);
        info!("Read Crysol profile with {} points", profile.q.len());
        Ok(profile)
    }

    fn write_to(profile: &IntProfile, writer: &mut impl Write) -> Result<(), CurveError> {
        writeln!(writer, "{:<15} {:<18} {:<15}", "Q(A-1)", "I(solution)", "I(vacuum)")?;
        for ((q, solution), vacuum) in profile.q.iter().zip(&profile.solution).zip(&profile.vacuum) {
            writeln!(
                writer,
                "{:<15} {:<18} {:<15}",
                q.to_string(),
                solution.to_string(),
                vacuum.to_string()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn dat_parse_skips_header_and_non_positive_q() {
        let text = "Q(A-1) I(au) Error\n\
                    -1.0 5.0 0.5\n\
                    0.0 6.0 0.5\n\
                    0.01 100.0 2.0\n\
                    0.02 abc 2.0\n\
                    0.03 80.0\n\
                    0.04 70.0 1.0 extra\n";
        let curve = DatFile::parse(text);
        assert_eq!(curve.axis(), &[0.01, 0.04]);
        assert_eq!(curve.values(), &[100.0, 70.0]);
        assert_eq!(curve.third(), &[2.0, 1.0]);
    }

    #[test]
    fn fit_parse_requires_positive_observed_values() {
        let text = "0.01 10.0 9.5\n0.02 0.0 8.0\n0.03 -1.0 7.0\n0.04 6.0 6.5\n";
        let curve = FitFile::parse(text);
        assert_eq!(curve.kind(), CurveKind::Fit);
        assert_eq!(curve.axis(), &[0.01, 0.04]);
        assert_eq!(curve.third(), &[9.5, 6.5]);
    }

    #[test]
    fn out_parse_reads_only_the_bounded_section() {
        let text = "  Real space: Rg =   30.1\n\
                    1.0 9.0 9.0\n\
                    \x20  R          P(R)      ERROR\n\
                    \n\
                    0.0000E+00  0.0000E+00  0.0000E+00\n\
                    1.5 0.25 0.01\n\
                    3.0 0.50 0.02\n\
                    4.5 0.10 0.01\n\
                    Reciprocal space: Rg = 31.4\n\
                    6.0 0.05 0.01\n";
        let curve = OutFile::parse(text).unwrap();
        assert_eq!(curve.kind(), CurveKind::PairDistance);
        assert_eq!(curve.axis(), &[1.5, 3.0, 4.5]);
        assert_eq!(curve.values(), &[0.25, 0.50, 0.10]);
        assert_eq!(curve.dmax(), Some(4.5));
        assert_eq!(curve.number_of_bins(), Some(3));
    }

    #[test]
    fn out_parse_uses_the_last_section_header() {
        let text = "   R          P(R)      ERROR\n\
                    1.0 1.0 1.0\n\
                    \x20  R          P(R)      ERROR\n\
                    2.0 2.0 2.0\n";
        let curve = OutFile::parse(text).unwrap();
        assert_eq!(curve.axis(), &[2.0]);
    }

    #[test]
    fn out_parse_fails_without_section_header() {
        assert!(matches!(
            OutFile::parse("1.0 2.0 3.0\n"),
            Err(CurveError::SectionNotFound)
        ));
    }

    const CRYSOL_INT: &str = " Dif/Atom/Shl/Exc  4.5E+07  4.3E+07  1.2E+06  3.0E+05\n\
                               0.000000E+00  4.500000E+07  4.300000E+07  1.0E+06\n\
                               1.000000E-02  4.400000E+07  4.250000E+07  1.0E+06\n\
                               2.000000E-02  4.100000E+07  4.000000E+07  1.0E+06\n\
                               3.000000E-02  3.700000E+07  3.600000E+07  1.0E+06\n";

    #[test]
    fn int_parse_keeps_forward_scattering_row() {
        let profile = IntFile::parse(CRYSOL_INT);
        assert_eq!(profile.q, vec![0.0, 0.01, 0.02, 0.03]);
        assert_eq!(profile.i_zero(IntColumn::Solution), Some(4.5e7));
        assert_eq!(profile.i_zero(IntColumn::Vacuum), Some(4.3e7));
        assert_eq!(IntFile::parse("0.01 1.0 1.0\n").i_zero(IntColumn::Solution), None);
    }

    #[test]
    fn int_profile_converts_to_a_bounded_curve_with_background() {
        let profile = IntFile::parse(CRYSOL_INT);

        let curve = profile.to_curve(IntColumn::Vacuum, 1.0e6, 0.0, 0.03);

        assert_eq!(curve.kind(), CurveKind::Intensity);
        assert_eq!(curve.axis(), &[0.01, 0.02]);
        assert_eq!(curve.values(), &[4.35e7, 4.1e7]);
        assert_eq!(curve.third(), &[0.0, 0.0]);
    }

    #[test]
    fn render_writes_titled_left_justified_columns() {
        let curve = DatFile::parse("0.01 100.5 2.0\n0.02 90.25 1.5\n");
        let out = render(&curve);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], format!("{:<15} {:<18} {:<15}", "Q(A-1)", "I(au)", "Error"));
        assert_eq!(lines[1], format!("{:<15} {:<18} {:<15}", "0.01", "100.5", "2"));
        assert_eq!(DatFile::parse(&out), curve);
    }

    #[test]
    fn read_from_path_checks_extension_per_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sample.dat");
        fs::write(&path, "0.01 1.0 0.1\n").unwrap();

        assert_eq!(DatFile::read_from_path(&path).unwrap().len(), 1);
        assert!(matches!(
            OutFile::read_from_path(&path),
            Err(CurveError::Input(InputFileError::WrongExtension { .. }))
        ));
        assert!(matches!(
            FitFile::read_from_path(dir.path().join("missing.fit")),
            Err(CurveError::Input(InputFileError::NotFound(_)))
        ));
    }
}
