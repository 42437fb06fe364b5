#![allow(dead_code)]

use cvt_tables::{CodePageId, MappingTable};

/// A small double-byte code page: ASCII `A`, one lead byte with a defined and an
/// undefined trail, and an alternate sequence for U+3000 when `with_alternate` is set.
pub fn toy_dbcs_text(with_alternate: bool) -> String {
    let mut text = String::from(
        "# toy double-byte table\n\
         0x41\t0x0041\t#LATIN CAPITAL LETTER A\n\
         0x81\t\t#DBCS LEAD BYTE\n\
         0x8140\t0x3000\t#IDEOGRAPHIC SPACE\n\
         0x8141\t\t#UNDEFINED\n",
    );
    if with_alternate {
        text.push_str("0x8142\t0x3000\t#IDEOGRAPHIC SPACE (alternate)\n");
    }
    text
}

pub fn toy_code_page() -> CodePageId {
    CodePageId::new("toy").expect("valid code page label")
}

pub fn toy_dbcs(with_alternate: bool) -> MappingTable {
    MappingTable::parse(toy_code_page(), &toy_dbcs_text(with_alternate))
        .expect("toy table parses")
}
