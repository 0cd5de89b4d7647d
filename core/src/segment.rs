//! Display-only segmentation of a buffer into plain text runs and chips.

use std::ops::Range;

use quill_protocol::EntityCatalog;
use quill_protocol::RefKind;

use crate::grammar;
use crate::resolver;

/// One run of the rendered buffer.
///
/// `range` is the byte span of the buffer this segment stands for. For a
/// chip it is exactly the placeholder's span, while `text` is the resolved
/// label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub range: Range<usize>,
    pub is_reference: bool,
    pub kind: Option<RefKind>,
    /// Only meaningful for chips: whether the id was found in the catalog.
    pub resolved: bool,
}

impl Segment {
    fn plain(text: &str, range: Range<usize>) -> Self {
        Self {
            text: text.to_string(),
            range,
            is_reference: false,
            kind: None,
            resolved: true,
        }
    }
}

/// Split `buffer` into maximal plain-text runs and one segment per token.
///
/// Pure: the same `(buffer, catalog)` always yields the same segments, and
/// an empty buffer yields none so a placeholder can show through.
pub fn segment(buffer: &str, catalog: &EntityCatalog) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;
    for token in grammar::decode(buffer) {
        if token.start() > last {
            segments.push(Segment::plain(
                &buffer[last..token.start()],
                last..token.start(),
            ));
        }
        let label = resolver::resolve(catalog, &token.reference);
        segments.push(Segment {
            text: label.text,
            range: token.range.clone(),
            is_reference: true,
            kind: Some(token.reference.kind()),
            resolved: label.resolved,
        });
        last = token.end();
    }
    if last < buffer.len() {
        segments.push(Segment::plain(&buffer[last..], last..buffer.len()));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_protocol::Character;

    fn catalog() -> EntityCatalog {
        EntityCatalog {
            characters: vec![Character {
                id: 7,
                name: "Ada".to_string(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn empty_buffer_has_no_segments() {
        assert_eq!(segment("", &catalog()), Vec::new());
    }

    #[test]
    fn splits_text_and_chips() {
        let buffer = "abc{{@::Character::7}}def";
        assert_eq!(
            segment(buffer, &catalog()),
            vec![
                Segment::plain("abc", 0..3),
                Segment {
                    text: "Ada".to_string(),
                    range: 3..22,
                    is_reference: true,
                    kind: Some(RefKind::Character),
                    resolved: true,
                },
                Segment::plain("def", 22..25),
            ]
        );
    }

    #[test]
    fn dangling_reference_degrades_without_error() {
        let segments = segment("{{@::Character::9999}}", &EntityCatalog::default());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "Character#9999");
        assert!(segments[0].is_reference);
        assert!(!segments[0].resolved);
        assert_eq!(segments[0].range, 0..22);
    }

    #[test]
    fn adjacent_chips_have_no_empty_text_between() {
        let buffer = "{{@::Character::7}}{{@::Memo::1}}";
        let segments = segment(buffer, &catalog());
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| s.is_reference));
        assert_eq!(segments[0].range.end, segments[1].range.start);
    }

    #[test]
    fn segmentation_is_pure() {
        let buffer = "x {{@::Character::7}} y {{@::Chapter::2::summary}}";
        let catalog = catalog();
        assert_eq!(segment(buffer, &catalog), segment(buffer, &catalog));
    }
}
