use super::atom::AtomRecord;
use super::record::Record;
use super::template::AtomTemplate;
use nalgebra::Point3;

/// An ordered, exclusively owned sequence of PDB records.
///
/// A record's position in the table is its key: for parsed files it is the
/// 0-based source line index, which need not match the atom serial number.
/// Records are written back out in this order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    records: Vec<Record>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Record> {
        self.records.get_mut(index)
    }

    /// Appends a record and returns its index.
    pub fn push(&mut self, record: impl Into<Record>) -> usize {
        self.records.push(record.into());
        self.records.len() - 1
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Iterates over ATOM and HETATM records in table order.
    pub fn atoms(&self) -> impl Iterator<Item = &AtomRecord> {
        self.records.iter().filter_map(Record::as_atom)
    }

    pub fn atoms_mut(&mut self) -> impl Iterator<Item = &mut AtomRecord> {
        self.records.iter_mut().filter_map(Record::as_atom_mut)
    }

    pub fn atom_count(&self) -> usize {
        self.atoms().count()
    }

    /// Appends a new atom built from `template` and returns its index.
    ///
    /// `position` and `bfactor`, when given, override the template's values for
    /// this atom only.
    pub fn push_from_template(
        &mut self,
        template: &AtomTemplate,
        position: Option<Point3<f64>>,
        bfactor: Option<f64>,
    ) -> usize {
        self.push(template.instantiate(position, bfactor))
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl FromIterator<Record> for RecordTable {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RecordTable {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
