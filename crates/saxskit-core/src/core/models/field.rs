use std::fmt;
use std::str::FromStr;

/// How a field's text is converted on read and rendered on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Decimal integer, right-justified.
    Integer,
    /// Fixed-point number rendered with `precision` decimal places, right-justified.
    Float { precision: usize },
    /// Trimmed text, right-justified (except where noted on the field).
    Text,
}

/// The fields of an ATOM/HETATM line, in wwPDB v3.30 column order.
///
/// Column ranges are 0-indexed and end-exclusive. They are the single source of
/// truth for both the parser and the serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AtomField {
    RecordType,
    SerialNo,
    AtomName,
    Alternate,
    Residue,
    Chain,
    ResidueNo,
    Icode,
    X,
    Y,
    Z,
    Occupancy,
    Bfactor,
    Element,
    Charge,
}

impl AtomField {
    pub const ALL: [AtomField; 15] = [
        AtomField::RecordType,
        AtomField::SerialNo,
        AtomField::AtomName,
        AtomField::Alternate,
        AtomField::Residue,
        AtomField::Chain,
        AtomField::ResidueNo,
        AtomField::Icode,
        AtomField::X,
        AtomField::Y,
        AtomField::Z,
        AtomField::Occupancy,
        AtomField::Bfactor,
        AtomField::Element,
        AtomField::Charge,
    ];

    /// Returns the `[start, end)` column range of the field.
    pub const fn columns(self) -> (usize, usize) {
        match self {
            AtomField::RecordType => (0, 6),
            AtomField::SerialNo => (6, 11),
            AtomField::AtomName => (12, 16),
            AtomField::Alternate => (16, 17),
            AtomField::Residue => (17, 20),
            AtomField::Chain => (21, 22),
            AtomField::ResidueNo => (22, 26),
            AtomField::Icode => (26, 27),
            AtomField::X => (30, 38),
            AtomField::Y => (38, 46),
            AtomField::Z => (46, 54),
            AtomField::Occupancy => (54, 60),
            AtomField::Bfactor => (60, 66),
            AtomField::Element => (76, 78),
            AtomField::Charge => (78, 80),
        }
    }

    pub const fn width(self) -> usize {
        let (start, end) = self.columns();
        end - start
    }

    pub const fn kind(self) -> FieldKind {
        match self {
            AtomField::SerialNo | AtomField::ResidueNo => FieldKind::Integer,
            AtomField::X | AtomField::Y | AtomField::Z => FieldKind::Float { precision: 3 },
            AtomField::Occupancy | AtomField::Bfactor => FieldKind::Float { precision: 2 },
            _ => FieldKind::Text,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            AtomField::RecordType => "record_type",
            AtomField::SerialNo => "serial_no",
            AtomField::AtomName => "atom_name",
            AtomField::Alternate => "alternate",
            AtomField::Residue => "residue",
            AtomField::Chain => "chain",
            AtomField::ResidueNo => "residue_no",
            AtomField::Icode => "icode",
            AtomField::X => "x",
            AtomField::Y => "y",
            AtomField::Z => "z",
            AtomField::Occupancy => "occupancy",
            AtomField::Bfactor => "bfactor",
            AtomField::Element => "element",
            AtomField::Charge => "charge",
        }
    }
}

impl fmt::Display for AtomField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AtomField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AtomField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or(())
    }
}
