use super::mass::MassUnit;
use crate::core::elements::residue_info;
use crate::core::models::atom::{AtomKind, AtomRecord};
use crate::core::models::table::RecordTable;
use nalgebra::Point3;
use thiserror::Error;
use tracing::info;

/// Mass assumed for a residue that is not one of the twenty standard amino acids.
pub const UNKNOWN_RESIDUE_MASS: f64 = 110.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResidueError {
    #[error("Structure has no CA atoms to build a sequence from")]
    EmptySequence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceCode {
    #[default]
    OneLetter,
    ThreeLetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtinctionUnit {
    /// M^-1 cm^-1.
    Molar,
    /// Absorbance of a 1 g/l solution, the molar value divided by weight in Da.
    #[default]
    Absorbance,
}

fn sequence_atoms(table: &RecordTable) -> impl Iterator<Item = &AtomRecord> {
    table
        .atoms()
        .filter(|atom| atom.kind == AtomKind::Atom && atom.atom_name == "CA")
}

/// Residue sequence read from the CA atoms, in table order.
///
/// Non-standard residues become `X` or `XXX`.
pub fn sequence(table: &RecordTable, code: SequenceCode) -> Vec<String> {
    let mut unknown = 0;
    let sequence: Vec<String> = sequence_atoms(table)
        .map(|atom| match (residue_info(&atom.residue), code) {
            (Some(info), SequenceCode::OneLetter) => info.code.to_string(),
            (Some(_), SequenceCode::ThreeLetter) => atom.residue.clone(),
            (None, SequenceCode::OneLetter) => {
                unknown += 1;
                "X".to_string()
            }
            (None, SequenceCode::ThreeLetter) => {
                unknown += 1;
                "XXX".to_string()
            }
        })
        .collect();
    if unknown > 0 {
        info!(unknown, "There are unknown residue types in the structure");
    }
    sequence
}

/// One-letter sequence as a single string.
pub fn sequence_string(table: &RecordTable) -> String {
    sequence(table, SequenceCode::OneLetter).concat()
}

/// Molecular weight estimated from residue masses.
///
/// Kilodalton results are rounded to one decimal place.
pub fn estimated_weight(table: &RecordTable, unit: MassUnit) -> f64 {
    let daltons: f64 = sequence_atoms(table)
        .map(|atom| residue_info(&atom.residue).map_or(UNKNOWN_RESIDUE_MASS, |r| r.mass))
        .sum();
    match unit {
        MassUnit::Dalton => daltons,
        MassUnit::KiloDalton => (daltons / 100.0).round() / 10.0,
    }
}

/// Extinction coefficient at 280 nm from the Trp, Tyr and Cys content.
pub fn extinction_coefficient(
    table: &RecordTable,
    unit: ExtinctionUnit,
) -> Result<f64, ResidueError> {
    let seq = sequence(table, SequenceCode::OneLetter);
    let count = |code: &str| seq.iter().filter(|c| *c == code).count() as f64;
    let molar = count("W") * 5500.0 + count("Y") * 1490.0 + count("C") * 125.0;
    match unit {
        ExtinctionUnit::Molar => Ok(molar),
        ExtinctionUnit::Absorbance => {
            if seq.is_empty() {
                return Err(ResidueError::EmptySequence);
            }
            Ok(molar / estimated_weight(table, MassUnit::Dalton))
        }
    }
}

/// Backbone CA, C and O positions of one residue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackboneFrame {
    pub ca: Point3<f64>,
    pub c: Point3<f64>,
    pub o: Point3<f64>,
}

/// Looks up the CA, C and O atoms of residue `residue_no`.
///
/// Returns `None` unless all three are present with coordinates. When an atom
/// name repeats (several chains share the number), the last one wins.
pub fn backbone_frame(table: &RecordTable, residue_no: i64) -> Option<BackboneFrame> {
    let (mut ca, mut c, mut o) = (None, None, None);
    for atom in table
        .atoms()
        .filter(|atom| atom.kind == AtomKind::Atom && atom.residue_no == Some(residue_no))
    {
        let slot = match atom.atom_name.as_str() {
            "CA" => &mut ca,
            "C" => &mut c,
            "O" => &mut o,
            _ => continue,
        };
        if let Some(position) = atom.position() {
            *slot = Some(position);
        }
    }
    Some(BackboneFrame {
        ca: ca?,
        c: c?,
        o: o?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::pdb::PdbFile;

    const PEPTIDE: &str = "\
ATOM      1  N   TRP A   1       0.000   0.000   0.000  1.00 20.00           N
ATOM      2  CA  TRP A   1       1.000   0.000   0.000  1.00 20.00           C
ATOM      3  C   TRP A   1       2.000   0.000   0.000  1.00 20.00           C
ATOM      4  O   TRP A   1       2.000   1.000   0.000  1.00 20.00           O
ATOM      5  CA  TYR A   2       3.000   0.000   0.000  1.00 20.00           C
ATOM      6  CA  CYS A   3       4.000   0.000   0.000  1.00 20.00           C
ATOM      7  CA  MSE A   4       5.000   0.000   0.000  1.00 20.00           C
HETATM    8  CA  HOH A   5       6.000   0.000   0.000  1.00 20.00           O
END
";

    #[test]
    fn sequence_reads_ca_atoms_of_atom_records_only() {
        let table = PdbFile::parse(PEPTIDE);
        assert_eq!(sequence_string(&table), "WYCX");
        assert_eq!(
            sequence(&table, SequenceCode::ThreeLetter),
            vec!["TRP", "TYR", "CYS", "XXX"]
        );
    }

    #[test]
    fn estimated_weight_uses_residue_masses_with_fallback() {
        let table = PdbFile::parse(PEPTIDE);
        let daltons = 186.12 + 163.18 + 103.15 + UNKNOWN_RESIDUE_MASS;
        assert!((estimated_weight(&table, MassUnit::Dalton) - daltons).abs() < 1e-9);
        assert_eq!(estimated_weight(&table, MassUnit::KiloDalton), 0.6);
    }

    #[test]
    fn extinction_coefficient_counts_trp_tyr_and_cys() {
        let table = PdbFile::parse(PEPTIDE);
        let molar = extinction_coefficient(&table, ExtinctionUnit::Molar).unwrap();
        assert_eq!(molar, 5500.0 + 1490.0 + 125.0);

        let absorbance = extinction_coefficient(&table, ExtinctionUnit::Absorbance).unwrap();
        let expected = molar / estimated_weight(&table, MassUnit::Dalton);
        assert!((absorbance - expected).abs() < 1e-12);

        assert_eq!(
            extinction_coefficient(&RecordTable::new(), ExtinctionUnit::Absorbance),
            Err(ResidueError::EmptySequence)
        );
    }

    #[test]
    fn backbone_frame_requires_all_three_atoms() {
        let table = PdbFile::parse(PEPTIDE);
        let frame = backbone_frame(&table, 1).unwrap();
        assert_eq!(frame.ca, Point3::new(1.0, 0.0, 0.0));
        assert_eq!(frame.o, Point3::new(2.0, 1.0, 0.0));
        assert!(backbone_frame(&table, 2).is_none());
        assert!(backbone_frame(&table, 42).is_none());
    }
}
