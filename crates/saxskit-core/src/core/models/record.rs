use super::atom::{AtomKind, AtomRecord};

/// Any non-coordinate line (HEADER, REMARK, TER, END, ...), kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRecord {
    /// Columns 1-6 with trailing spaces removed.
    pub record_type: String,
    /// Everything from column 7 to the end of the line, untouched.
    pub payload: String,
    /// Width of the source line in characters, if it was parsed from text.
    pub line_width: Option<usize>,
}

impl RawRecord {
    pub fn new(record_type: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            payload: payload.into(),
            line_width: None,
        }
    }

    pub fn with_line_width(mut self, width: usize) -> Self {
        self.line_width = Some(width);
        self
    }
}

/// One line of a PDB file.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Atom(AtomRecord),
    Raw(RawRecord),
}

impl Record {
    pub fn record_type(&self) -> &str {
        match self {
            Record::Atom(atom) => atom.kind.as_str(),
            Record::Raw(raw) => &raw.record_type,
        }
    }

    pub fn is_atom(&self) -> bool {
        matches!(self, Record::Atom(_))
    }

    pub fn as_atom(&self) -> Option<&AtomRecord> {
        match self {
            Record::Atom(atom) => Some(atom),
            Record::Raw(_) => None,
        }
    }

    pub fn as_atom_mut(&mut self) -> Option<&mut AtomRecord> {
        match self {
            Record::Atom(atom) => Some(atom),
            Record::Raw(_) => None,
        }
    }

    pub fn atom_kind(&self) -> Option<AtomKind> {
        self.as_atom().map(|atom| atom.kind)
    }
}

impl From<AtomRecord> for Record {
    fn from(atom: AtomRecord) -> Self {
        Record::Atom(atom)
    }
}

impl From<RawRecord> for Record {
    fn from(raw: RawRecord) -> Self {
        Record::Raw(raw)
    }
}
