//! Reference mapping tables for legacy code pages.
//!
//! A [`MappingTable`] is the authoritative byte-sequence <-> code point mapping that
//! conversion facets are checked against. Tables come from three places:
//!
//! - text files in the unicode.org mapping format (`0x80\t0x20AC\t#EURO SIGN`),
//! - tables bundled with this crate (currently `cp1258`),
//! - single-byte encodings known to `encoding_rs`, enumerated byte by byte.
//!
//! Consumers normally go through the object-safe [`ReferenceTable`] trait so a
//! harness can be driven by any provider.

mod code_page;
mod error;
mod mapping;
mod reference;

pub use code_page::CodePageId;
pub use error::TableError;
pub use mapping::{MappingEntry, MappingTable, MAX_SEQUENCE_LEN};
pub use reference::{ByteClass, ReferenceTable};

/// Largest Unicode scalar value a table entry may map to.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;
