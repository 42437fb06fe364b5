mod common;

use std::path::Path;

use cvt_codec::WideWidth;
use cvt_conformance::{CodecKind, HarnessError, Manifest};
use cvt_tables::CodePageId;
use pretty_assertions::assert_eq;

fn write_manifest(dir: &Path, json: &str) -> std::path::PathBuf {
    let path = dir.join("suites.json");
    std::fs::write(&path, json).unwrap();
    path
}

#[test]
fn loads_suites_and_resolves_relative_tables() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("tables")).unwrap();
    std::fs::write(
        dir.path().join("tables/toy.txt"),
        common::toy_dbcs_text(true),
    )
    .unwrap();
    let path = write_manifest(
        dir.path(),
        r#"{
  "suites": [
    { "code_page": "windows-1258" },
    { "code_page": "1252", "codec": "encoding", "wide": "u32", "max_wide": 1114111 },
    { "code_page": "toy", "codec": "table", "table": "tables/toy.txt", "charset_size": 200 }
  ]
}"#,
    );

    let manifest = Manifest::load(&path).unwrap();
    assert_eq!(manifest.suites.len(), 3);

    let cp1258 = &manifest.suites[0];
    assert_eq!(cp1258.code_page, CodePageId::from_number(1258));
    assert_eq!(cp1258.codec, CodecKind::Cp1258);
    assert_eq!(cp1258.charset_size, 0x100);
    assert_eq!(cp1258.max_wide, 0xFFFF);

    let cp1252 = &manifest.suites[1];
    assert_eq!(cp1252.wide, WideWidth::U32);
    assert_eq!(cp1252.max_wide, 0x10FFFF);

    let toy = &manifest.suites[2];
    assert_eq!(toy.table.as_deref(), Some(dir.path().join("tables/toy.txt").as_path()));
    assert_eq!(toy.charset_size, 200);
}

#[test]
fn every_manifest_suite_runs() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("toy.txt"), common::toy_dbcs_text(false)).unwrap();
    let path = write_manifest(
        dir.path(),
        r#"{
  "suites": [
    { "code_page": "cp1258" },
    { "code_page": "cp1252", "codec": "encoding" },
    { "code_page": "toy", "codec": "table", "table": "toy.txt" }
  ]
}"#,
    );

    for spec in Manifest::load(&path).unwrap().suites {
        let verdict = spec.run().unwrap();
        assert!(verdict.all_passed(), "{verdict}");
    }
}

#[test]
fn empty_manifests_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(dir.path(), r#"{ "suites": [] }"#);
    let err = Manifest::load(&path).unwrap_err();
    assert!(matches!(err, HarnessError::EmptyManifest { .. }), "{err}");
}

#[test]
fn malformed_manifests_are_rejected() {
    let dir = tempfile::tempdir().unwrap();

    let path = write_manifest(dir.path(), r#"{ "suites": [ { "codec": "cp1258" } ] }"#);
    let err = Manifest::load(&path).unwrap_err();
    assert!(matches!(err, HarnessError::ManifestParse { .. }), "{err}");

    let path = write_manifest(dir.path(), r#"{ "suites": [ { "code_page": "cp 1258" } ] }"#);
    let err = Manifest::load(&path).unwrap_err();
    assert!(matches!(err, HarnessError::ManifestParse { .. }), "{err}");

    let missing = dir.path().join("nope.json");
    let err = Manifest::load(&missing).unwrap_err();
    assert!(matches!(err, HarnessError::ManifestIo { .. }), "{err}");
}
