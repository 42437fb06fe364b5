use std::fmt;

use serde::Serialize;

use crate::CodePageId;

/// What a single byte value means on its own in a code page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteClass {
    /// The byte is a complete character.
    SingleByte,
    /// The byte starts a multi-byte sequence.
    LeadByte,
    /// The byte has no mapping.
    Invalid,
}

impl ByteClass {
    pub fn as_str(self) -> &'static str {
        match self {
            ByteClass::SingleByte => "single_byte",
            ByteClass::LeadByte => "lead_byte",
            ByteClass::Invalid => "invalid",
        }
    }
}

impl fmt::Display for ByteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authoritative mapping for one code page.
///
/// Implementations must be deterministic: the same query always yields the same answer.
pub trait ReferenceTable {
    fn code_page(&self) -> &CodePageId;

    fn classify_byte(&self, byte: u8) -> ByteClass;

    /// Code point for a complete byte sequence, or `None` when the sequence is unmapped.
    fn decode(&self, bytes: &[u8]) -> Option<u32>;

    /// Canonical byte sequence for a code point.
    fn encode(&self, wide: u32) -> Option<&[u8]>;

    /// Every multi-byte sequence starting with `lead`, with its code point
    /// (`None` for sequences the table lists as undefined).
    fn sequences_with_lead(&self, lead: u8) -> Vec<(Vec<u8>, Option<u32>)>;

    /// Whether `bytes` is the sequence [`ReferenceTable::encode`] returns for its code point.
    fn is_canonical(&self, bytes: &[u8]) -> bool {
        match self.decode(bytes) {
            Some(wide) => self.encode(wide) == Some(bytes),
            None => false,
        }
    }
}
