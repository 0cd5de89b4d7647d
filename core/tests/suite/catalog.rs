use core_test_support::write_fixture;
use pretty_assertions::assert_eq;
use quill_core::RefKind;
use quill_core::catalog::load_catalog;
use quill_core::error::QuillErr;
use tempfile::TempDir;

fn tempdir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(e) => panic!("failed to create tempdir: {e}"),
    }
}

#[test]
fn loads_catalog_from_json_file() {
    let dir = tempdir();
    let path = write_fixture(
        &dir,
        "catalog.json",
        r#"{
            "characters": [{"id": 7, "name": "Ada Reyes"}],
            "world_settings": [{"id": 3, "name": "Salt Coast"}],
            "memos": [{"id": 1, "title": "Timeline"}],
            "chapters": [{"id": 12, "title": "The Ferry"}]
        }"#,
    );
    let catalog = match load_catalog(&path) {
        Ok(catalog) => catalog,
        Err(e) => panic!("catalog should load: {e}"),
    };
    assert_eq!(catalog.name_of(RefKind::Character, 7), Some("Ada Reyes"));
    assert_eq!(catalog.name_of(RefKind::Memo, 1), Some("Timeline"));
    assert_eq!(catalog.entries(RefKind::Chapter).len(), 1);
}

#[test]
fn malformed_catalog_names_the_file() {
    let dir = tempdir();
    let path = write_fixture(&dir, "broken.json", "{\"characters\": [");
    match load_catalog(&path) {
        Err(QuillErr::CatalogParse { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn missing_catalog_is_io_error() {
    let dir = tempdir();
    let result = load_catalog(&dir.path().join("absent.json"));
    assert!(matches!(result, Err(QuillErr::Io(_))));
}
