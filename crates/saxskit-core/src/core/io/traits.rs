use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File-level failures shared by every format reader.
#[derive(Debug, Error)]
pub enum InputFileError {
    #[error("Input file not found: {0}")]
    NotFound(PathBuf),
    #[error("Input file '{path}' does not have a recognised extension (expected one of: {expected})")]
    WrongExtension { path: PathBuf, expected: String },
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Checks that `path` exists and carries one of `extensions` (case-insensitive).
pub fn validate_input_path(path: &Path, extensions: &[&str]) -> Result<(), InputFileError> {
    if !path.exists() {
        return Err(InputFileError::NotFound(path.to_path_buf()));
    }
    let matches = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));
    if !matches {
        return Err(InputFileError::WrongExtension {
            path: path.to_path_buf(),
            expected: extensions
                .iter()
                .map(|e| format!(".{e}"))
                .collect::<Vec<_>>()
                .join(", "),
        });
    }
    Ok(())
}

/// Common interface for the flat-text formats.
///
/// Implementors parse a whole text stream into `Data` and write it back.
/// Path-based helpers validate existence and extension before reading.
pub trait RecordFile {
    /// The in-memory representation of one file.
    type Data;

    type Error: Error + From<io::Error> + From<InputFileError>;

    /// Accepted file extensions, without the leading dot.
    const EXTENSIONS: &'static [&'static str];

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Data, Self::Error>;

    fn write_to(data: &Self::Data, writer: &mut impl Write) -> Result<(), Self::Error>;

    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self::Data, Self::Error> {
        let path = path.as_ref();
        validate_input_path(path, Self::EXTENSIONS)?;
        let file = File::open(path).map_err(|source| InputFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    fn write_to_path<P: AsRef<Path>>(data: &Self::Data, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(data, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
