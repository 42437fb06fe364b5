use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use encoding_rs::Encoding;

use crate::{ByteClass, CodePageId, ReferenceTable, TableError, MAX_CODE_POINT};

/// Longest byte sequence a mapping table may contain (SBCS/DBCS tables only).
pub const MAX_SEQUENCE_LEN: usize = 2;

const BUNDLED: &[(&str, &str)] = &[("cp1258", include_str!("../tables/cp1258.txt"))];

/// One line of a mapping table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub bytes: Vec<u8>,
    /// `None` marks a sequence the table explicitly leaves undefined.
    pub wide: Option<u32>,
}

impl MappingEntry {
    pub fn mapped(bytes: impl Into<Vec<u8>>, wide: u32) -> Self {
        Self {
            bytes: bytes.into(),
            wide: Some(wide),
        }
    }

    pub fn undefined(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            wide: None,
        }
    }
}

/// Byte sequence <-> code point table for one code page.
///
/// When several sequences decode to the same code point, the first one listed is the
/// canonical encoding and the rest are decode-only alternates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingTable {
    code_page: CodePageId,
    forward: BTreeMap<Vec<u8>, Option<u32>>,
    reverse: BTreeMap<u32, Vec<u8>>,
    lead_bytes: BTreeSet<u8>,
}

impl MappingTable {
    /// Parse a table in the unicode.org mapping format.
    ///
    /// Each non-comment line holds a byte sequence (`0xHH` or `0xHHHH`) and, optionally,
    /// a code point (`0xXXXX`). Everything after `#` is ignored.
    pub fn parse(code_page: CodePageId, text: &str) -> Result<Self, TableError> {
        let mut entries = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let content = raw.split('#').next().unwrap_or_default().trim();
            if content.is_empty() {
                continue;
            }

            let mut columns = content.split_whitespace();
            let Some(sequence) = columns.next() else {
                continue;
            };
            let bytes =
                parse_sequence(sequence).map_err(|message| TableError::Parse { line, message })?;
            let wide = columns
                .next()
                .map(parse_code_point)
                .transpose()
                .map_err(|message| TableError::Parse { line, message })?;
            if let Some(extra) = columns.next() {
                return Err(TableError::Parse {
                    line,
                    message: format!("unexpected column '{extra}'"),
                });
            }

            entries.push((line, MappingEntry { bytes, wide }));
        }

        Self::build(code_page, entries)
    }

    pub fn load(code_page: CodePageId, path: &Path) -> Result<Self, TableError> {
        let text = std::fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(code_page, &text)
    }

    /// Build a table from entries already in memory. Entry order decides canonical sequences.
    pub fn from_entries(
        code_page: CodePageId,
        entries: impl IntoIterator<Item = MappingEntry>,
    ) -> Result<Self, TableError> {
        Self::build(
            code_page,
            entries
                .into_iter()
                .enumerate()
                .map(|(idx, entry)| (idx + 1, entry)),
        )
    }

    /// Table shipped with this crate.
    pub fn bundled(code_page: &CodePageId) -> Result<Self, TableError> {
        let text = BUNDLED
            .iter()
            .find(|(name, _)| *name == code_page.as_str())
            .map(|(_, text)| *text)
            .ok_or_else(|| TableError::UnknownCodePage(code_page.to_string()))?;
        Self::parse(code_page.clone(), text)
    }

    pub fn has_bundled(code_page: &CodePageId) -> bool {
        BUNDLED.iter().any(|(name, _)| *name == code_page.as_str())
    }

    /// Enumerate all 256 byte values of a single-byte `encoding_rs` encoding.
    ///
    /// Bytes the encoding refuses to decode become undefined entries.
    pub fn from_encoding(
        code_page: CodePageId,
        encoding: &'static Encoding,
    ) -> Result<Self, TableError> {
        if !encoding.is_single_byte() {
            return Err(TableError::NotSingleByte(encoding.name()));
        }

        let entries = (0..=u8::MAX).map(|byte| {
            let buf = [byte];
            let decoded = encoding.decode_without_bom_handling_and_without_replacement(&buf);
            let mut chars = decoded.as_deref().unwrap_or_default().chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => MappingEntry::mapped([byte], c as u32),
                _ => MappingEntry::undefined([byte]),
            }
        });
        Self::from_entries(code_page, entries)
    }

    /// Bundled table if there is one, otherwise a table derived from `encoding_rs`.
    pub fn for_code_page(code_page: &CodePageId) -> Result<Self, TableError> {
        if Self::has_bundled(code_page) {
            return Self::bundled(code_page);
        }

        let encoding = code_page
            .encoding()
            .ok_or_else(|| TableError::UnknownCodePage(code_page.to_string()))?;
        if !encoding.is_single_byte() {
            return Err(TableError::UnknownCodePage(code_page.to_string()));
        }
        log::warn!(
            "no bundled table for {code_page}; deriving reference from encoding_rs {}",
            encoding.name()
        );
        Self::from_encoding(code_page.clone(), encoding)
    }

    fn build(
        code_page: CodePageId,
        entries: impl IntoIterator<Item = (usize, MappingEntry)>,
    ) -> Result<Self, TableError> {
        let mut forward = BTreeMap::new();
        let mut reverse = BTreeMap::new();
        let mut lead_bytes = BTreeSet::new();

        for (line, entry) in entries {
            if entry.bytes.is_empty() || entry.bytes.len() > MAX_SEQUENCE_LEN {
                return Err(TableError::Parse {
                    line,
                    message: format!(
                        "byte sequence must be 1..={MAX_SEQUENCE_LEN} bytes, got {}",
                        entry.bytes.len()
                    ),
                });
            }
            if let Some(wide) = entry.wide {
                if wide > MAX_CODE_POINT {
                    return Err(TableError::Parse {
                        line,
                        message: format!("code point 0x{wide:X} is above U+10FFFF"),
                    });
                }
            }
            if forward.contains_key(&entry.bytes) {
                return Err(TableError::DuplicateSequence {
                    line,
                    sequence: hex_sequence(&entry.bytes),
                });
            }

            if entry.bytes.len() > 1 {
                lead_bytes.insert(entry.bytes[0]);
            }
            if let Some(wide) = entry.wide {
                reverse.entry(wide).or_insert_with(|| entry.bytes.clone());
            }
            forward.insert(entry.bytes, entry.wide);
        }

        // Single-byte lines for a lead byte may only mark it undefined
        // (the "DBCS LEAD BYTE" convention).
        for &lead in &lead_bytes {
            if let Some(Some(_)) = forward.get([lead].as_slice()) {
                return Err(TableError::LeadByteConflict { byte: lead });
            }
        }

        Ok(Self {
            code_page,
            forward,
            reverse,
            lead_bytes,
        })
    }

    /// Number of entries, defined and undefined.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn lead_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.lead_bytes.iter().copied()
    }

    /// Longest sequence in the table.
    pub fn max_sequence_len(&self) -> usize {
        if self.lead_bytes.is_empty() {
            1
        } else {
            MAX_SEQUENCE_LEN
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = MappingEntry> + '_ {
        self.forward.iter().map(|(bytes, wide)| MappingEntry {
            bytes: bytes.clone(),
            wide: *wide,
        })
    }

}

impl ReferenceTable for MappingTable {
    fn code_page(&self) -> &CodePageId {
        &self.code_page
    }

    fn classify_byte(&self, byte: u8) -> ByteClass {
        if self.lead_bytes.contains(&byte) {
            return ByteClass::LeadByte;
        }
        match self.forward.get([byte].as_slice()) {
            Some(Some(_)) => ByteClass::SingleByte,
            _ => ByteClass::Invalid,
        }
    }

    fn decode(&self, bytes: &[u8]) -> Option<u32> {
        self.forward.get(bytes).copied().flatten()
    }

    fn encode(&self, wide: u32) -> Option<&[u8]> {
        self.reverse.get(&wide).map(Vec::as_slice)
    }

    fn sequences_with_lead(&self, lead: u8) -> Vec<(Vec<u8>, Option<u32>)> {
        if !self.lead_bytes.contains(&lead) {
            return Vec::new();
        }
        self.forward
            .range(vec![lead, 0x00]..=vec![lead, 0xFF])
            .map(|(bytes, wide)| (bytes.clone(), *wide))
            .collect()
    }
}

fn parse_sequence(token: &str) -> Result<Vec<u8>, String> {
    let digits = strip_hex_prefix(token)
        .ok_or_else(|| format!("byte sequence '{token}' must start with 0x"))?;
    if !is_hex(digits) {
        return Err(format!("invalid hex in byte sequence '{token}'"));
    }
    if digits.is_empty() || digits.len() % 2 != 0 {
        return Err(format!(
            "byte sequence '{token}' must have an even number of hex digits"
        ));
    }
    if digits.len() / 2 > MAX_SEQUENCE_LEN {
        return Err(format!(
            "byte sequence '{token}' is longer than {MAX_SEQUENCE_LEN} bytes"
        ));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| format!("invalid hex in byte sequence '{token}'"))
        })
        .collect()
}

fn parse_code_point(token: &str) -> Result<u32, String> {
    let digits = strip_hex_prefix(token)
        .ok_or_else(|| format!("code point '{token}' must start with 0x"))?;
    if digits.is_empty() || !is_hex(digits) {
        return Err(format!("invalid code point '{token}'"));
    }
    let value =
        u32::from_str_radix(digits, 16).map_err(|_| format!("invalid code point '{token}'"))?;
    if value > MAX_CODE_POINT {
        return Err(format!("code point '{token}' is above U+10FFFF"));
    }
    Ok(value)
}

fn strip_hex_prefix(token: &str) -> Option<&str> {
    token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
}

// `from_str_radix` alone would accept a leading `+`.
fn is_hex(digits: &str) -> bool {
    digits.bytes().all(|b| b.is_ascii_hexdigit())
}

fn hex_sequence(bytes: &[u8]) -> String {
    let mut out = String::from("0x");
    for byte in bytes {
        out.push_str(&format!("{byte:02X}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cp(name: &str) -> CodePageId {
        CodePageId::new(name).unwrap()
    }

    #[test]
    fn parses_defined_and_undefined_lines() {
        let text = "# header\n0x41\t0x0041\t#LATIN CAPITAL LETTER A\n0x81\t\t#UNDEFINED\n\n";
        let table = MappingTable::parse(cp("cp1258"), text).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.decode(b"A"), Some(0x41));
        assert_eq!(table.decode(&[0x81]), None);
        assert_eq!(table.classify_byte(0x81), ByteClass::Invalid);
        assert_eq!(table.classify_byte(0x41), ByteClass::SingleByte);
    }

    #[test]
    fn reports_line_numbers_for_malformed_entries() {
        let text = "0x41\t0x0041\n0xZZ\t0x0042\n";
        let err = MappingTable::parse(cp("cp1258"), text).unwrap_err();
        match err {
            TableError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rejects_odd_and_oversized_sequences() {
        assert!(parse_sequence("0x123").is_err());
        assert!(parse_sequence("0x123456").is_err());
        assert!(parse_sequence("41").is_err());
        assert_eq!(parse_sequence("0X8140").unwrap(), vec![0x81, 0x40]);
    }

    #[test]
    fn rejects_signed_hex_digits() {
        assert!(parse_sequence("0x+4").is_err());
        assert!(parse_code_point("0x+41").is_err());
        assert!(parse_code_point("0x").is_err());
        let err = MappingTable::parse(cp("cp1258"), "0x41 0x0041\n0x+4 0x+41\n").unwrap_err();
        assert!(matches!(err, TableError::Parse { line: 2, .. }), "{err}");
    }

    #[test]
    fn single_byte_encodings_are_enumerated_byte_by_byte() {
        let table = MappingTable::from_encoding(cp("cp1252"), encoding_rs::WINDOWS_1252).unwrap();
        assert_eq!(table.len(), 256);
        assert_eq!(table.decode(&[0x80]), Some(0x20AC));
        assert_eq!(table.encode(0xE9), Some([0xE9u8].as_slice()));
    }

    #[test]
    fn rejects_code_points_above_unicode_range() {
        let err = MappingTable::parse(cp("cp1258"), "0x41 0x110000\n").unwrap_err();
        assert!(matches!(err, TableError::Parse { line: 1, .. }));
    }

    #[test]
    fn rejects_duplicate_sequences() {
        let err = MappingTable::parse(cp("cp1258"), "0x41 0x41\n0x41 0x42\n").unwrap_err();
        assert!(matches!(err, TableError::DuplicateSequence { line: 2, .. }));
    }

    #[test]
    fn lead_byte_with_single_byte_mapping_is_a_conflict() {
        let err = MappingTable::parse(cp("cp932"), "0x81 0x0081\n0x8140 0x3000\n").unwrap_err();
        assert!(matches!(err, TableError::LeadByteConflict { byte: 0x81 }));
    }

    #[test]
    fn undefined_lead_byte_marker_is_allowed() {
        let text = "0x81\t\t#DBCS LEAD BYTE\n0x8140\t0x3000\n0x8141\t0x3001\n";
        let table = MappingTable::parse(cp("cp932"), text).unwrap();
        assert_eq!(table.classify_byte(0x81), ByteClass::LeadByte);
        assert_eq!(table.max_sequence_len(), 2);
        assert_eq!(
            table.sequences_with_lead(0x81),
            vec![(vec![0x81, 0x40], Some(0x3000)), (vec![0x81, 0x41], Some(0x3001))]
        );
        assert!(table.sequences_with_lead(0x41).is_empty());
    }

    #[test]
    fn first_listed_sequence_is_canonical() {
        let text = "0x41 0x0041\n0xC1 0x0041\n";
        let table = MappingTable::parse(cp("cp1258"), text).unwrap();
        assert_eq!(table.encode(0x41), Some(b"A".as_slice()));
        assert!(table.is_canonical(b"A"));
        assert!(!table.is_canonical(&[0xC1]));
        assert_eq!(table.decode(&[0xC1]), Some(0x41));
    }

    #[test]
    fn unknown_code_page_is_an_error() {
        let err = MappingTable::for_code_page(&cp("cp9999")).unwrap_err();
        assert!(matches!(err, TableError::UnknownCodePage(_)));
    }

    #[test]
    fn multi_byte_encodings_cannot_be_enumerated() {
        let err = MappingTable::from_encoding(cp("cp932"), encoding_rs::SHIFT_JIS).unwrap_err();
        assert!(matches!(err, TableError::NotSingleByte(_)));
    }
}
