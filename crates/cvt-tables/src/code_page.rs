use std::fmt;
use std::str::FromStr;

use encoding_rs::{
    Encoding, BIG5, EUC_KR, GBK, SHIFT_JIS, UTF_8, WINDOWS_1250, WINDOWS_1251, WINDOWS_1252,
    WINDOWS_1253, WINDOWS_1254, WINDOWS_1255, WINDOWS_1256, WINDOWS_1257, WINDOWS_1258,
    WINDOWS_874,
};
use serde::{Deserialize, Serialize};

use crate::TableError;

/// Normalized name of a legacy code page.
///
/// Numeric code pages are stored as `cp<N>` regardless of how they were spelled
/// (`1258`, `CP1258`, `windows-1258`); anything else is kept as a lower-cased label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CodePageId(String);

impl CodePageId {
    pub fn new(name: &str) -> Result<Self, TableError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(TableError::InvalidCodePage(trimmed.to_string()));
        }
        let lower = trimmed.to_ascii_lowercase();
        let digits = lower
            .strip_prefix("windows-")
            .or_else(|| lower.strip_prefix("cp"))
            .or_else(|| lower.strip_prefix("ibm"))
            .unwrap_or(&lower);
        if let Ok(number) = digits.parse::<u16>() {
            return Ok(Self(format!("cp{number}")));
        }
        if lower
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        {
            return Err(TableError::InvalidCodePage(trimmed.to_string()));
        }
        Ok(Self(lower))
    }

    pub fn from_number(number: u16) -> Self {
        Self(format!("cp{number}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Windows code page number, when the identifier is numeric.
    pub fn number(&self) -> Option<u16> {
        self.0.strip_prefix("cp").and_then(|n| n.parse().ok())
    }

    /// The `encoding_rs` encoding for this code page, if it is one we know.
    pub fn encoding(&self) -> Option<&'static Encoding> {
        match self.number() {
            Some(number) => encoding_for_codepage(number),
            None => Encoding::for_label(self.0.as_bytes()),
        }
    }
}

pub(crate) fn encoding_for_codepage(codepage: u16) -> Option<&'static Encoding> {
    Some(match codepage {
        874 => WINDOWS_874,
        932 => SHIFT_JIS,
        936 => GBK,
        949 => EUC_KR,
        950 => BIG5,
        1250 => WINDOWS_1250,
        1251 => WINDOWS_1251,
        1252 => WINDOWS_1252,
        1253 => WINDOWS_1253,
        1254 => WINDOWS_1254,
        1255 => WINDOWS_1255,
        1256 => WINDOWS_1256,
        1257 => WINDOWS_1257,
        1258 => WINDOWS_1258,
        65001 => UTF_8,
        _ => return None,
    })
}

impl fmt::Display for CodePageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CodePageId {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CodePageId {
    type Error = TableError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CodePageId> for String {
    fn from(value: CodePageId) -> Self {
        value.0
    }
}
