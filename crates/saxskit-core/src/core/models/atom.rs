use nalgebra::Point3;
use std::fmt;

/// The two coordinate-bearing PDB record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AtomKind {
    /// Standard polymer atom (`ATOM`).
    #[default]
    Atom,
    /// Heterogen atom such as a ligand, ion or water (`HETATM`).
    Hetatm,
}

impl AtomKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            AtomKind::Atom => "ATOM",
            AtomKind::Hetatm => "HETATM",
        }
    }

    /// Classifies a record type that has already had trailing spaces trimmed.
    ///
    /// Only the exact strings `ATOM` and `HETATM` are coordinate records.
    pub fn from_record_type(record_type: &str) -> Option<Self> {
        match record_type {
            "ATOM" => Some(AtomKind::Atom),
            "HETATM" => Some(AtomKind::Hetatm),
            _ => None,
        }
    }
}

impl fmt::Display for AtomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field-decomposed ATOM or HETATM line.
///
/// Numeric fields are `None` when their columns did not convert; an absent
/// coordinate is absent, never zero. Text fields hold the trimmed column
/// content and are empty when the columns were blank.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AtomRecord {
    pub kind: AtomKind,
    pub serial_no: Option<i64>,
    /// Atom name, e.g. "CA" or "P".
    pub atom_name: String,
    /// Alternate location indicator.
    pub alternate: String,
    /// Residue or monomer name, e.g. "ALA".
    pub residue: String,
    pub chain: String,
    pub residue_no: Option<i64>,
    /// Insertion code.
    pub icode: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub occupancy: Option<f64>,
    pub bfactor: Option<f64>,
    /// Element symbol; may be empty.
    pub element: String,
    pub charge: String,
    /// Character width of the source line, used to restore trailing blanks on write.
    pub line_width: Option<usize>,
}

impl AtomRecord {
    pub fn new(kind: AtomKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Returns the coordinates when all three of `x`, `y` and `z` are present.
    pub fn position(&self) -> Option<Point3<f64>> {
        match (self.x, self.y, self.z) {
            (Some(x), Some(y), Some(z)) => Some(Point3::new(x, y, z)),
            _ => None,
        }
    }

    pub fn set_position(&mut self, position: Point3<f64>) {
        self.x = Some(position.x);
        self.y = Some(position.y);
        self.z = Some(position.z);
    }

    /// The symbol used for mass lookup.
    ///
    /// The `element` column when it is non-empty, otherwise the first character
    /// of `atom_name`. An alpha carbon "CA" with a blank element column therefore
    /// resolves to carbon, and so would a calcium ion named "CA".
    pub fn element_symbol(&self) -> Option<&str> {
        if !self.element.is_empty() {
            return Some(&self.element);
        }
        let first = self.atom_name.chars().next()?;
        Some(&self.atom_name[..first.len_utf8()])
    }
}
