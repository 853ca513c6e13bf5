use super::traits::{InputFileError, RecordFile};
use crate::core::models::atom::{AtomKind, AtomRecord};
use crate::core::models::field::{AtomField, FieldKind};
use crate::core::models::record::{RawRecord, Record};
use crate::core::models::table::RecordTable;
use crate::core::utils::parse;
use std::io::{self, BufRead, Read, Write};
use thiserror::Error;
use tracing::debug;

/// Width of the blank line every ATOM/HETATM record is written into.
const LINE_WIDTH: usize = 80;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Input(#[from] InputFileError),
    #[error(
        "Record {index}: {field} value '{text}' is wider than its {width}-column field"
    )]
    FieldOverflow {
        index: usize,
        field: AtomField,
        text: String,
        width: usize,
    },
}

/// Options for serializing a [`RecordTable`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PdbWriteOptions {
    /// Emit only ATOM/HETATM records, dropping headers and footers.
    pub atoms_only: bool,
}

pub struct PdbFile;

impl PdbFile {
    /// Parses PDB text into a table, one record per line.
    ///
    /// Never fails: unconvertible fields are left empty and every line becomes
    /// a record.
    pub fn parse(text: &str) -> RecordTable {
        let table: RecordTable = text.lines().map(Self::parse_line).collect();
        debug!(
            "Parsed {} PDB records ({} atoms)",
            table.len(),
            table.atom_count()
        );
        table
    }

    /// Decomposes a single line.
    pub fn parse_line(line: &str) -> Record {
        let split = line.char_indices().nth(6).map_or(line.len(), |(i, _)| i);
        let (head, payload) = line.split_at(split);
        let record_type = head.trim_end();

        match AtomKind::from_record_type(record_type) {
            Some(kind) => Record::Atom(parse_atom(kind, line)),
            None => Record::Raw(
                RawRecord::new(record_type, payload).with_line_width(line.chars().count()),
            ),
        }
    }

    /// Serializes a table to text, one newline-terminated line per record.
    pub fn render(table: &RecordTable, options: PdbWriteOptions) -> Result<String, PdbError> {
        let mut out = String::new();
        for (index, record) in table.iter().enumerate() {
            match record {
                Record::Atom(atom) => out.push_str(&format_atom(index, atom)?),
                Record::Raw(_) if options.atoms_only => continue,
                Record::Raw(raw) => out.push_str(&format_raw(raw)),
            }
            out.push('\n');
        }
        Ok(out)
    }

    pub fn write_with(
        table: &RecordTable,
        options: PdbWriteOptions,
        writer: &mut impl Write,
    ) -> Result<(), PdbError> {
        writer.write_all(Self::render(table, options)?.as_bytes())?;
        Ok(())
    }

    pub fn write_with_to_path<P: AsRef<std::path::Path>>(
        table: &RecordTable,
        options: PdbWriteOptions,
        path: P,
    ) -> Result<(), PdbError> {
        let text = Self::render(table, options)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

impl RecordFile for PdbFile {
    type Data = RecordTable;
    type Error = PdbError;

    const EXTENSIONS: &'static [&'static str] = &["pdb", "ent"];

    fn read_from(reader: &mut impl BufRead) -> Result<RecordTable, PdbError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self::parse(&text))
    }

    fn write_to(table: &RecordTable, writer: &mut impl Write) -> Result<(), PdbError> {
        Self::write_with(table, PdbWriteOptions::default(), writer)
    }
}

fn parse_atom(kind: AtomKind, line: &str) -> AtomRecord {
    let slice = |field: AtomField| {
        let (start, end) = field.columns();
        parse::columns(line, start, end)
    };
    let text = |field: AtomField| slice(field).trim().to_string();
    let number = |field: AtomField| {
        let value = parse::field::<f64>(slice(field));
        if value.is_none() && !slice(field).trim().is_empty() {
            debug!("Omitting unparsable {} '{}'", field, slice(field).trim());
        }
        value
    };
    let integer = |field: AtomField| {
        let value = parse::field::<i64>(slice(field));
        if value.is_none() && !slice(field).trim().is_empty() {
            debug!("Omitting unparsable {} '{}'", field, slice(field).trim());
        }
        value
    };

    AtomRecord {
        kind,
        serial_no: integer(AtomField::SerialNo),
        atom_name: text(AtomField::AtomName),
        alternate: text(AtomField::Alternate),
        residue: text(AtomField::Residue),
        chain: text(AtomField::Chain),
        residue_no: integer(AtomField::ResidueNo),
        icode: text(AtomField::Icode),
        x: number(AtomField::X),
        y: number(AtomField::Y),
        z: number(AtomField::Z),
        occupancy: number(AtomField::Occupancy),
        bfactor: number(AtomField::Bfactor),
        element: text(AtomField::Element),
        charge: text(AtomField::Charge),
        line_width: Some(line.chars().count()),
    }
}

fn format_raw(raw: &RawRecord) -> String {
    let line = if raw.payload.is_empty() {
        raw.record_type.clone()
    } else {
        format!("{:<6}{}", raw.record_type, raw.payload)
    };
    match raw.line_width {
        Some(width) if width > line.chars().count() => format!("{line:<width$}"),
        _ => line,
    }
}

/// Renders the text of one field, or `None` when the field is absent.
fn field_text(atom: &AtomRecord, field: AtomField) -> Option<String> {
    let width = field.width();
    let integer = |value: Option<i64>| value.map(|v| format!("{v:>width$}"));
    let float = |value: Option<f64>, precision: usize| {
        value.map(|v| format!("{v:>width$.precision$}"))
    };
    let text = |value: &str| (!value.is_empty()).then(|| format!("{value:>width$}"));

    match (field, field.kind()) {
        (AtomField::RecordType, _) => Some(format!("{:<width$}", atom.kind.as_str())),
        (AtomField::SerialNo, _) => integer(atom.serial_no),
        (AtomField::ResidueNo, _) => integer(atom.residue_no),
        (AtomField::X, FieldKind::Float { precision }) => float(atom.x, precision),
        (AtomField::Y, FieldKind::Float { precision }) => float(atom.y, precision),
        (AtomField::Z, FieldKind::Float { precision }) => float(atom.z, precision),
        (AtomField::Occupancy, FieldKind::Float { precision }) => float(atom.occupancy, precision),
        (AtomField::Bfactor, FieldKind::Float { precision }) => float(atom.bfactor, precision),
        (AtomField::AtomName, _) => (!atom.atom_name.is_empty())
            .then(|| format!("{:>width$}", format!("{:<3}", atom.atom_name))),
        (AtomField::Alternate, _) => text(&atom.alternate),
        (AtomField::Residue, _) => text(&atom.residue),
        (AtomField::Chain, _) => text(&atom.chain),
        (AtomField::Icode, _) => text(&atom.icode),
        (AtomField::Element, _) => text(&atom.element),
        (AtomField::Charge, _) => text(&atom.charge),
        _ => None,
    }
}

fn format_atom(index: usize, atom: &AtomRecord) -> Result<String, PdbError> {
    let mut buffer = [' '; LINE_WIDTH];
    for field in AtomField::ALL {
        let Some(text) = field_text(atom, field) else {
            continue;
        };
        let (start, end) = field.columns();
        if text.chars().count() > field.width() {
            return Err(PdbError::FieldOverflow {
                index,
                field,
                text,
                width: field.width(),
            });
        }
        for (slot, ch) in buffer[start..end].iter_mut().zip(text.chars()) {
            *slot = ch;
        }
    }

    let line: String = buffer.iter().collect();
    let trimmed = line.trim_end();
    Ok(match atom.line_width {
        Some(width) if width > trimmed.len() => format!("{trimmed:<width$}"),
        _ => trimmed.to_string(),
    })
}
