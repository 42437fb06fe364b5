use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("invalid code page name '{0}'")]
    InvalidCodePage(String),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("line {line}: byte sequence {sequence} is listed more than once")]
    DuplicateSequence { line: usize, sequence: String },
    #[error("byte 0x{byte:02X} is both a lead byte and a single-byte character")]
    LeadByteConflict { byte: u8 },
    #[error("code page {0} has no bundled table and is not a single-byte encoding_rs encoding")]
    UnknownCodePage(String),
    #[error("encoding {0} is not a single-byte encoding; supply a mapping file instead")]
    NotSingleByte(&'static str),
    #[error("read mapping table {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
