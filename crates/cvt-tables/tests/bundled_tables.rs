use std::io::Write;

use cvt_tables::{ByteClass, CodePageId, MappingTable, ReferenceTable, TableError};
use pretty_assertions::assert_eq;

const CP1258_UNDEFINED: [u8; 9] = [0x81, 0x8A, 0x8D, 0x8E, 0x8F, 0x90, 0x9A, 0x9D, 0x9E];

fn cp1258() -> CodePageId {
    CodePageId::from_number(1258)
}

#[test]
fn bundled_cp1258_covers_every_byte() {
    let table = MappingTable::bundled(&cp1258()).expect("bundled cp1258");
    assert_eq!(table.len(), 256);
    assert_eq!(table.max_sequence_len(), 1);
    assert_eq!(table.lead_bytes().count(), 0);

    let invalid: Vec<u8> = (0..=u8::MAX)
        .filter(|&b| table.classify_byte(b) == ByteClass::Invalid)
        .collect();
    assert_eq!(invalid, CP1258_UNDEFINED.to_vec());
}

#[test]
fn bundled_cp1258_places_vietnamese_combining_marks() {
    let table = MappingTable::bundled(&cp1258()).unwrap();
    for (byte, wide) in [
        (0xCC, 0x0300),
        (0xEC, 0x0301),
        (0xDE, 0x0303),
        (0xD2, 0x0309),
        (0xF2, 0x0323),
    ] {
        assert_eq!(table.decode(&[byte]), Some(wide), "byte 0x{byte:02X}");
        assert_eq!(table.encode(wide), Some([byte].as_slice()));
    }
    // Dong sign and the horned letters.
    assert_eq!(table.decode(&[0xFE]), Some(0x20AB));
    assert_eq!(table.decode(&[0xD5]), Some(0x01A0));
    assert_eq!(table.decode(&[0xFD]), Some(0x01B0));
}

#[test]
fn bundled_cp1258_boundaries_are_defined() {
    let table = MappingTable::bundled(&cp1258()).unwrap();
    assert_eq!(table.decode(&[0x00]), Some(0x0000));
    assert_eq!(table.decode(&[0xFF]), Some(0x00FF));
    assert_eq!(table.encode(0xFFFF), None);
}

#[test]
fn encoding_rs_fills_cp1258_holes_with_c1_controls() {
    let bundled = MappingTable::bundled(&cp1258()).unwrap();
    let derived = MappingTable::from_encoding(cp1258(), encoding_rs::WINDOWS_1258).unwrap();

    let differing: Vec<u8> = (0..=u8::MAX)
        .filter(|&b| bundled.decode(&[b]) != derived.decode(&[b]))
        .collect();
    assert_eq!(differing, CP1258_UNDEFINED.to_vec());
    for byte in CP1258_UNDEFINED {
        assert_eq!(derived.decode(&[byte]), Some(u32::from(byte)));
    }
}

#[test]
fn derives_tables_for_other_single_byte_code_pages() {
    let table = MappingTable::for_code_page(&CodePageId::from_number(1251)).unwrap();
    assert_eq!(table.code_page().as_str(), "cp1251");
    // CYRILLIC CAPITAL LETTER A
    assert_eq!(table.decode(&[0xC0]), Some(0x0410));
}

#[test]
fn dbcs_code_pages_need_a_table_file() {
    let err = MappingTable::for_code_page(&CodePageId::from_number(932)).unwrap_err();
    assert!(matches!(err, TableError::UnknownCodePage(ref name) if name == "cp932"));
}

#[test]
fn loads_table_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "#  toy DBCS table").unwrap();
    writeln!(file, "0x41\t0x0041").unwrap();
    writeln!(file, "0x81\t\t#DBCS LEAD BYTE").unwrap();
    writeln!(file, "0x8140\t0x3000").unwrap();
    writeln!(file, "0x8141").unwrap();
    file.flush().unwrap();

    let table = MappingTable::load(CodePageId::new("toy").unwrap(), file.path()).unwrap();
    assert_eq!(table.classify_byte(0x81), ByteClass::LeadByte);
    assert_eq!(table.decode(&[0x81, 0x40]), Some(0x3000));
    assert_eq!(table.decode(&[0x81, 0x41]), None);
    assert_eq!(
        table.sequences_with_lead(0x81),
        vec![(vec![0x81, 0x40], Some(0x3000)), (vec![0x81, 0x41], None)]
    );
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.txt");
    let err = MappingTable::load(cp1258(), &path).unwrap_err();
    assert!(err.to_string().contains("missing.txt"), "{err}");
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn bundled_decode_then_encode_is_identity(byte in any::<u8>()) {
            let table = MappingTable::bundled(&cp1258()).unwrap();
            if let Some(wide) = table.decode(&[byte]) {
                let expected = [byte];
                prop_assert_eq!(table.encode(wide), Some(&expected[..]));
            } else {
                prop_assert!(CP1258_UNDEFINED.contains(&byte));
            }
        }

        #[test]
        fn parser_never_panics(text in "\\PC{0,200}") {
            let _ = MappingTable::parse(cp1258(), &text);
        }
    }
}
