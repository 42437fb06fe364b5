#![no_main]

use cvt_tables::{CodePageId, MappingTable, ReferenceTable};
use libfuzzer_sys::fuzz_target;

/// Real mapping files are a few tens of KiB; keep the harness bounded.
const MAX_INPUT_BYTES: usize = 256 * 1024;

fuzz_target!(|data: &[u8]| {
    if data.len() > MAX_INPUT_BYTES {
        return;
    }
    let text = String::from_utf8_lossy(data);
    let Ok(code_page) = CodePageId::new("fuzz") else {
        return;
    };
    let Ok(table) = MappingTable::parse(code_page, &text) else {
        return;
    };

    // Every canonical sequence must decode back to its code point.
    for entry in table.entries() {
        let Some(wide) = entry.wide else {
            continue;
        };
        let canonical = table.encode(wide).expect("mapped code point has an encoding");
        assert_eq!(table.decode(canonical), Some(wide));
    }
    for lead in table.lead_bytes() {
        for (sequence, _) in table.sequences_with_lead(lead) {
            assert_eq!(sequence[0], lead);
        }
    }
});
