//! End-to-end editing scenarios: buffer edits followed by segmentation.

use core_test_support::load_default_config_for_test;
use core_test_support::sample_catalog;
use pretty_assertions::assert_eq;
use quill_core::CaretMove;
use quill_core::EntityCatalog;
use quill_core::RefKind;
use quill_core::TokenBuffer;
use quill_core::segment;
use tempfile::TempDir;

#[test]
fn backspace_then_arrow_scenarios() {
    let text = "abc{{@::Character::7}}def";

    let mut buffer = TokenBuffer::from_value(text);
    buffer.set_caret(3);
    buffer.move_caret(CaretMove::Right);
    assert_eq!(buffer.caret(), 22);

    assert!(buffer.backspace());
    assert_eq!(buffer.value(), "abcdef");
}

#[test]
fn multi_insert_then_segment() {
    let catalog = sample_catalog();
    let mut buffer = TokenBuffer::from_value("See .");
    buffer.set_caret(4);
    let before = buffer.caret();
    assert!(buffer.insert_reference(RefKind::WorldSetting, &[3, 9], None));
    let inserted = "{{@::WorldSetting::3}} {{@::WorldSetting::9}}";
    assert_eq!(buffer.caret(), before + inserted.len());

    let labels: Vec<(String, bool)> = segment(buffer.value(), &catalog)
        .into_iter()
        .map(|s| (s.text, s.is_reference))
        .collect();
    assert_eq!(
        labels,
        vec![
            ("See ".to_string(), false),
            ("Salt Coast".to_string(), true),
            (" ".to_string(), false),
            ("Glass Archive".to_string(), true),
            (".".to_string(), false),
        ]
    );
}

#[test]
fn dangling_reference_segments_against_empty_catalog() {
    let segments = segment("{{@::Character::9999}}", &EntityCatalog::default());
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].text, "Character#9999");
    assert!(segments[0].is_reference);
}

#[test]
fn buffer_value_is_passed_through_unchanged() {
    let stored = "Open with {{@::Chapter::12::summary}} and {{@::Memo::0001}}.";
    let buffer = TokenBuffer::from_value(stored);
    assert_eq!(buffer.value(), stored);
    assert_eq!(buffer.tokens().len(), 2);
}

#[test]
fn default_config_uses_at_trigger() {
    let home = match TempDir::new() {
        Ok(dir) => dir,
        Err(e) => panic!("failed to create tempdir: {e}"),
    };
    let config = load_default_config_for_test(&home);
    assert_eq!(config.trigger, '@');
    assert_eq!(config.catalog_path, None);
}
