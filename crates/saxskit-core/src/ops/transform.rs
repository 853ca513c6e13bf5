use super::mass::{MassError, center_of_mass};
use crate::core::elements::MassLookup;
use crate::core::models::atom::{AtomKind, AtomRecord};
use crate::core::models::table::RecordTable;
use crate::core::utils::geometry::{
    distance, rotation_about_x, rotation_about_y, rotation_about_z,
};
use nalgebra::{Matrix3, Point3, Rotation3, Vector3};
use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error, PartialEq)]
pub enum TransformError {
    #[error(
        "Translation '{0}' must be three numbers delimited by ',', 'x' or spaces"
    )]
    InvalidTranslation(String),
    #[error("Rotation '{0}' must be an axis and angle in the form 'x10' or 'Z2.5'")]
    InvalidRotation(String),
    #[error("Rotation matrix '{0}' must be nine numbers in row-major order")]
    InvalidMatrix(String),
    #[error("Scale factor '{0}' is not a finite number")]
    InvalidScaleFactor(String),
    #[error("Chain name '{0}' must be a single character")]
    InvalidChainName(String),
    #[error("No atom with serial number {0}")]
    AtomNotFound(i64),
    #[error("Atom with serial number {0} has incomplete coordinates")]
    MissingCoordinates(i64),
    #[error("Cannot fit a symmetry axis: {0}")]
    SymmetryAxis(String),
    #[error(transparent)]
    Mass(#[from] MassError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'X' => Some(Axis::X),
            'Y' => Some(Axis::Y),
            'Z' => Some(Axis::Z),
            _ => None,
        }
    }

    pub fn rotation_matrix(self, degrees: f64) -> Matrix3<f64> {
        match self {
            Axis::X => rotation_about_x(degrees),
            Axis::Y => rotation_about_y(degrees),
            Axis::Z => rotation_about_z(degrees),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        f.write_str(name)
    }
}

/// A rotation, given either as an elementary axis rotation or a full matrix.
#[derive(Debug, Clone, PartialEq)]
pub enum Rotation {
    AxisAngle { axis: Axis, degrees: f64 },
    Matrix(Matrix3<f64>),
}

impl Rotation {
    pub fn matrix(&self) -> Matrix3<f64> {
        match self {
            Rotation::AxisAngle { axis, degrees } => axis.rotation_matrix(*degrees),
            Rotation::Matrix(m) => *m,
        }
    }
}

impl FromStr for Rotation {
    type Err = TransformError;

    /// Parses an axis letter followed by an angle in degrees, e.g. `"x10"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TransformError::InvalidRotation(s.to_string());
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let axis = chars.next().and_then(Axis::from_char).ok_or_else(invalid)?;
        let degrees: f64 = chars.as_str().trim().parse().map_err(|_| invalid())?;
        if !degrees.is_finite() {
            return Err(invalid());
        }
        Ok(Rotation::AxisAngle { axis, degrees })
    }
}

/// Splits on the non-blank `delimiters`, then on runs of whitespace.
///
/// Spaces around a delimiter are ignored, but an empty token (`"1,,2"`, a
/// leading or trailing delimiter) makes the whole string invalid.
fn parse_numbers(s: &str, delimiters: &[char]) -> Option<Vec<f64>> {
    let mut values = Vec::new();
    for piece in s.split(|c: char| c != ' ' && delimiters.contains(&c)) {
        let mut tokens = piece.split_whitespace().peekable();
        tokens.peek()?;
        for token in tokens {
            values.push(token.parse::<f64>().ok().filter(|v| v.is_finite())?);
        }
    }
    Some(values)
}

/// Parses `"1.0,2.0,3.0"`, `"1x2x3"` or `"1 2 3"` into an offset.
pub fn parse_translation(s: &str) -> Result<Vector3<f64>, TransformError> {
    match parse_numbers(s.trim(), &[',', 'x', ' ']).as_deref() {
        Some(&[x, y, z]) => Ok(Vector3::new(x, y, z)),
        _ => Err(TransformError::InvalidTranslation(s.to_string())),
    }
}

/// Parses a point with the same delimiters as a translation.
pub fn parse_point(s: &str) -> Result<Point3<f64>, TransformError> {
    parse_translation(s).map(Point3::from)
}

/// Parses nine comma- or space-separated numbers as a row-major 3x3 matrix.
pub fn parse_matrix(s: &str) -> Result<Matrix3<f64>, TransformError> {
    match parse_numbers(s.trim(), &[',', ' ', ';']) {
        Some(values) if values.len() == 9 => Ok(Matrix3::from_row_slice(&values)),
        _ => Err(TransformError::InvalidMatrix(s.to_string())),
    }
}

pub fn parse_scale_factor(s: &str) -> Result<f64, TransformError> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| TransformError::InvalidScaleFactor(s.to_string()))
}

/// Applies `f` to every atom with a complete position; returns how many moved.
fn map_positions(table: &mut RecordTable, mut f: impl FnMut(Point3<f64>) -> Point3<f64>) -> usize {
    let mut moved = 0;
    let mut skipped = 0;
    for atom in table.atoms_mut() {
        match atom.position() {
            Some(position) => {
                atom.set_position(f(position));
                moved += 1;
            }
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(
            atoms = skipped,
            "Atoms with incomplete coordinates were left in place"
        );
    }
    moved
}

pub fn translate(table: &mut RecordTable, offset: &Vector3<f64>) -> usize {
    info!("Translating by {}x{}x{}", offset.x, offset.y, offset.z);
    map_positions(table, |p| p + offset)
}

/// Rotates every atom by `v' = M v`.
///
/// With an `origin`, the structure is first translated so `origin` sits at
/// the coordinate origin, rotated, and translated back.
#[instrument(skip_all, name = "rotate")]
pub fn rotate(table: &mut RecordTable, rotation: &Rotation, origin: Option<&Point3<f64>>) -> usize {
    match rotation {
        Rotation::AxisAngle { axis, degrees } => {
            info!("Rotating around {} by {} degrees", axis, degrees)
        }
        Rotation::Matrix(_) => info!("Rotating by a user-supplied matrix"),
    }

    let shift = origin.map(|o| o.coords);
    if let Some(shift) = shift {
        translate(table, &-shift);
    }
    let matrix = rotation.matrix();
    let moved = map_positions(table, |p| Point3::from(matrix * p.coords));
    if let Some(shift) = shift {
        translate(table, &shift);
    }
    moved
}

pub fn scale(table: &mut RecordTable, factor: f64) -> Result<usize, TransformError> {
    if !factor.is_finite() {
        return Err(TransformError::InvalidScaleFactor(factor.to_string()));
    }
    info!("Scaling coordinates by {}", factor);
    Ok(map_positions(table, |p| Point3::from(p.coords * factor)))
}

/// Mirrors the structure through the xy plane by negating `z`.
pub fn invert(table: &mut RecordTable) -> usize {
    info!("Inverting the structure");
    let mut inverted = 0;
    for atom in table.atoms_mut() {
        if let Some(z) = atom.z.as_mut() {
            *z = -*z;
            inverted += 1;
        }
    }
    inverted
}

/// Moves the structure so its centre of mass sits at the origin.
///
/// Returns the offset that was applied.
pub fn center_on_origin(
    table: &mut RecordTable,
    masses: &impl MassLookup,
) -> Result<Vector3<f64>, TransformError> {
    let offset = -center_of_mass(table, masses)?.coords;
    translate(table, &offset);
    Ok(offset)
}

fn single_char(name: &str) -> Result<&str, TransformError> {
    if name.chars().count() == 1 {
        Ok(name)
    } else {
        Err(TransformError::InvalidChainName(name.to_string()))
    }
}

/// Renames chain `old` to `new` on every atom; returns the number renamed.
pub fn rename_chain(table: &mut RecordTable, old: &str, new: &str) -> Result<usize, TransformError> {
    let new = single_char(new)?;
    let mut renamed = 0;
    for atom in table.atoms_mut().filter(|atom| atom.chain == old) {
        atom.chain = new.to_string();
        renamed += 1;
    }
    info!("Renamed chain on {} atoms", renamed);
    Ok(renamed)
}

/// Sets every atom's chain to one upper-case letter.
pub fn assign_chain(table: &mut RecordTable, chain: &str) -> Result<usize, TransformError> {
    let upper = chain.trim().to_ascii_uppercase();
    let letter = single_char(&upper)?;
    if !letter.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(TransformError::InvalidChainName(chain.to_string()));
    }
    let mut assigned = 0;
    for atom in table.atoms_mut() {
        atom.chain = letter.to_string();
        assigned += 1;
    }
    Ok(assigned)
}

/// Distance between the first atoms carrying the two serial numbers.
pub fn distance_between(table: &RecordTable, serial_a: i64, serial_b: i64) -> Result<f64, TransformError> {
    let position_of = |serial: i64| {
        let mut matches = table.atoms().filter(|atom| atom.serial_no == Some(serial));
        let first = matches.next().ok_or(TransformError::AtomNotFound(serial))?;
        if matches.next().is_some() {
            warn!(serial, "Serial number is not unique; using the first instance");
        }
        first
            .position()
            .ok_or(TransformError::MissingCoordinates(serial))
    };
    Ok(distance(&position_of(serial_a)?, &position_of(serial_b)?))
}

/// Selects the atoms that trace a symmetry axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymmetryAxisOptions {
    /// Chains to use; `None` takes every chain with CA or P atoms.
    pub chains: Option<Vec<String>>,
    /// Keep only residues numbered strictly between the two bounds.
    pub residue_range: Option<(i64, i64)>,
    /// Reverse the atom order of every other chain (in chain-name order), so
    /// the first residue of one chain pairs with the last of the next.
    pub reverse_alternate: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryAlignment {
    /// Centre of the fitted axis before the structure was moved.
    pub centre: Point3<f64>,
    /// Unit direction of the fitted axis before the rotation.
    pub axis: Vector3<f64>,
    pub chains: Vec<String>,
    /// Number of residues common to every chain that traced the axis.
    pub residues: usize,
}

fn is_axis_atom(atom: &AtomRecord) -> bool {
    atom.kind == AtomKind::Atom && (atom.atom_name == "CA" || atom.atom_name == "P")
}

fn axis_error(reason: impl Into<String>) -> TransformError {
    TransformError::SymmetryAxis(reason.into())
}

/// Moves a symmetric assembly so its symmetry axis runs along Z through the origin.
///
/// The CA (or P) atoms of residues common to every selected chain are
/// averaged across chains, residue by residue. A line is fitted through those
/// centroids, the structure is translated so the line's centre sits at the
/// origin, and then rotated so the line points along +Z.
#[instrument(skip_all, name = "align_symmetry_axis")]
pub fn align_symmetry_axis(
    table: &mut RecordTable,
    options: &SymmetryAxisOptions,
) -> Result<SymmetryAlignment, TransformError> {
    if options.chains.as_ref().is_some_and(|chains| chains.len() < 2) {
        return Err(axis_error("at least two chains must be selected"));
    }

    let mut by_chain: BTreeMap<String, Vec<(i64, Point3<f64>)>> = BTreeMap::new();
    for atom in table.atoms().filter(|atom| is_axis_atom(atom)) {
        let selected = options
            .chains
            .as_ref()
            .is_none_or(|chains| chains.contains(&atom.chain));
        if let (true, Some(residue), Some(position)) = (selected, atom.residue_no, atom.position()) {
            by_chain
                .entry(atom.chain.clone())
                .or_default()
                .push((residue, position));
        }
    }
    if by_chain.len() < 2 {
        return Err(axis_error(format!(
            "found {} chain(s) with CA or P atoms, need at least two",
            by_chain.len()
        )));
    }

    let mut common: Option<BTreeSet<i64>> = None;
    for atoms in by_chain.values() {
        let residues: BTreeSet<i64> = atoms.iter().map(|(residue, _)| *residue).collect();
        common = Some(match common {
            Some(shared) => shared.intersection(&residues).copied().collect(),
            None => residues,
        });
    }
    let mut common = common.unwrap_or_default();
    if let Some((from, to)) = options.residue_range {
        common.retain(|residue| from < *residue && *residue < to);
    }
    info!(
        "There are {} residues common to chains {}",
        common.len(),
        by_chain.keys().cloned().collect::<Vec<_>>().join(",")
    );

    let mut tracks: Vec<Vec<Point3<f64>>> = by_chain
        .values()
        .map(|atoms| {
            atoms
                .iter()
                .filter(|(residue, _)| common.contains(residue))
                .map(|(_, position)| *position)
                .collect()
        })
        .collect();
    if options.reverse_alternate {
        for track in tracks.iter_mut().step_by(2) {
            track.reverse();
        }
    }
    let points = tracks[0].len();
    if tracks.iter().any(|track| track.len() != points) {
        return Err(axis_error(
            "chains carry different numbers of CA/P atoms over their common residues",
        ));
    }
    if points < 2 {
        return Err(axis_error(format!(
            "need at least two common residues, found {}",
            points
        )));
    }

    let line: Vec<Vector3<f64>> = (0..points)
        .map(|i| {
            tracks.iter().fold(Vector3::zeros(), |acc, track| acc + track[i].coords)
                / tracks.len() as f64
        })
        .collect();
    let centre = line.iter().sum::<Vector3<f64>>() / points as f64;
    let scatter = line.iter().fold(Matrix3::zeros(), |acc, p| {
        let d = p - centre;
        acc + d * d.transpose()
    });
    let eigen = scatter.symmetric_eigen();
    let principal = eigen.eigenvalues.imax();
    if !(eigen.eigenvalues[principal] > 0.0) {
        return Err(axis_error("axis points coincide"));
    }
    let axis = eigen.eigenvectors.column(principal).into_owned().normalize();

    let to_z = Rotation3::rotation_between(&axis, &Vector3::z())
        .unwrap_or_else(|| Rotation3::from_axis_angle(&Vector3::x_axis(), PI));
    translate(table, &-centre);
    let matrix = *to_z.matrix();
    map_positions(table, |p| Point3::from(matrix * p.coords));
    info!(
        "Aligned axis ({:.3}, {:.3}, {:.3}) onto Z",
        axis.x, axis.y, axis.z
    );

    Ok(SymmetryAlignment {
        centre: Point3::from(centre),
        axis,
        chains: by_chain.into_keys().collect(),
        residues: points,
    })
}
