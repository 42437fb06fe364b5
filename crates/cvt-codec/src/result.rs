use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Outcome of one conversion attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionResult<T> {
    /// `output` was produced from the first `consumed` input units.
    Success { output: T, consumed: usize },
    /// The input ends inside a valid but incomplete sequence.
    Partial { reason: PartialReason },
    Error { error: ConversionError },
}

impl<T> ConversionResult<T> {
    pub fn success(output: T, consumed: usize) -> Self {
        ConversionResult::Success { output, consumed }
    }

    pub fn truncated(lead: u8, needed: usize) -> Self {
        ConversionResult::Partial {
            reason: PartialReason::TruncatedSequence { lead, needed },
        }
    }

    pub fn error(error: ConversionError) -> Self {
        ConversionResult::Error { error }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, ConversionResult::Partial { .. })
    }

    pub fn output(&self) -> Option<&T> {
        match self {
            ConversionResult::Success { output, .. } => Some(output),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartialReason {
    /// `lead` starts a sequence that needs `needed` more bytes than the input holds.
    TruncatedSequence { lead: u8, needed: usize },
}

impl fmt::Display for PartialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartialReason::TruncatedSequence { lead, needed } => {
                write!(f, "lead byte 0x{lead:02X} needs {needed} more byte(s)")
            }
        }
    }
}

/// Why a conversion attempt failed.
///
/// `Unmappable` is the sentinel for input that is well-formed but has no counterpart
/// in the code page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionError {
    #[error("empty input")]
    EmptyInput,
    #[error("unmappable")]
    Unmappable,
    #[error("invalid sequence")]
    InvalidSequence,
    #[error("wide value out of range for the facet's character width")]
    WideOutOfRange,
}
