use std::path::PathBuf;

use cvt_tables::{CodePageId, TableError};
use thiserror::Error;

use crate::CodecKind;

/// Errors that stop a suite before any case runs.
///
/// Per-case conversion failures are never reported through this type; they are
/// collected in the [`crate::TestVerdict`].
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("character set size must be in 1..=256, got {0}")]
    InvalidCharsetSize(usize),
    #[error("max wide value 0x{max_wide:X} exceeds {limit_name} 0x{limit:X}")]
    InvalidMaxWide {
        max_wide: u32,
        limit: u32,
        limit_name: &'static str,
    },
    #[error("{component} is for code page {actual}, but the suite is configured for {expected}")]
    CodePageMismatch {
        component: &'static str,
        expected: CodePageId,
        actual: CodePageId,
    },
    #[error("codec {codec} is not available for code page {code_page}")]
    UnsupportedCodec {
        codec: CodecKind,
        code_page: CodePageId,
    },
    #[error("reference table for {code_page}")]
    Table {
        code_page: CodePageId,
        #[source]
        source: TableError,
    },
    #[error("read manifest {}", path.display())]
    ManifestIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse manifest {}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("manifest {} lists no suites", path.display())]
    EmptyManifest { path: PathBuf },
    #[error("suite for {0} has already completed")]
    AlreadyCompleted(CodePageId),
}
