//! Lays out a segmented buffer as styled terminal lines.
//!
//! Plain text is placed grapheme by grapheme and every reference chip is
//! placed as one unbreakable unit. The same pass records where each caret
//! stop lands on screen, so the drawn glyphs and the terminal cursor always
//! come from one layout.

use std::ops::Range;

use quill_core::RefKind;
use quill_core::Segment;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const TAB_WIDTH: usize = 4;

pub(crate) fn kind_color(kind: RefKind) -> Color {
    match kind {
        RefKind::Character => Color::Cyan,
        RefKind::WorldSetting => Color::Green,
        RefKind::Memo => Color::Yellow,
        RefKind::Chapter => Color::Magenta,
    }
}

/// Style for a chip. Unresolved references keep their kind colour but are
/// dimmed so a dangling id stands out.
pub(crate) fn chip_style(kind: RefKind, resolved: bool) -> Style {
    if resolved {
        Style::default().fg(Color::Black).bg(kind_color(kind))
    } else {
        Style::default()
            .fg(kind_color(kind))
            .bg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC | Modifier::DIM)
    }
}

/// Text drawn for a chip.
pub(crate) fn chip_text(label: &str) -> String {
    format!(" {label} ")
}

/// A caret stop: buffer offset and the cell it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CaretStop {
    offset: usize,
    row: u16,
    col: u16,
}

#[derive(Debug, Default)]
pub(crate) struct OverlayLayout {
    pub(crate) lines: Vec<Line<'static>>,
    stops: Vec<CaretStop>,
}

impl OverlayLayout {
    /// Number of rows the layout occupies (at least one).
    pub(crate) fn height(&self) -> u16 {
        self.lines.len().max(1) as u16
    }

    /// Cell `(col, row)` where the caret at `offset` is drawn.
    ///
    /// Offsets that are not caret stops (e.g. inside a grapheme cluster)
    /// map to the last stop before them.
    pub(crate) fn caret_position(&self, offset: usize) -> (u16, u16) {
        self.stops
            .iter()
            .rev()
            .find(|stop| stop.offset <= offset)
            .map(|stop| (stop.col, stop.row))
            .unwrap_or((0, 0))
    }
}

enum Unit<'a> {
    Newline { offset: usize },
    Glyph { offset: usize, text: &'a str },
    Chip { offset: usize, text: String, style: Style },
}

/// Lay `segments` out into lines no wider than `width` cells.
///
/// `end` is the byte length of the buffer the segments were computed from;
/// it becomes the final caret stop. Units that start inside `selection` are
/// drawn reversed.
pub(crate) fn layout(
    segments: &[Segment],
    end: usize,
    width: u16,
    selection: Option<Range<usize>>,
) -> OverlayLayout {
    let width = width.max(1) as usize;
    let mut units: Vec<Unit<'_>> = Vec::new();
    for segment in segments {
        match segment.kind {
            Some(kind) if segment.is_reference => units.push(Unit::Chip {
                offset: segment.range.start,
                text: chip_text(&segment.text),
                style: chip_style(kind, segment.resolved),
            }),
            _ => {
                for (idx, grapheme) in segment.text.grapheme_indices(true) {
                    let offset = segment.range.start + idx;
                    if grapheme == "\n" || grapheme == "\r\n" {
                        units.push(Unit::Newline { offset });
                    } else {
                        units.push(Unit::Glyph {
                            offset,
                            text: grapheme,
                        });
                    }
                }
            }
        }
    }

    let mut lines: Vec<Vec<Span<'static>>> = vec![Vec::new()];
    let mut stops = Vec::with_capacity(units.len() + 1);
    let mut row: usize = 0;
    let mut col: usize = 0;
    let selected = |offset: usize| selection.as_ref().is_some_and(|r| r.contains(&offset));

    for unit in units {
        match unit {
            Unit::Newline { offset } => {
                stops.push(stop(offset, row, col));
                lines.push(Vec::new());
                row += 1;
                col = 0;
            }
            Unit::Glyph { offset, text } => {
                let (display, w) = if text == "\t" {
                    (" ".repeat(TAB_WIDTH), TAB_WIDTH)
                } else {
                    (text.to_string(), text.width())
                };
                if col > 0 && col + w > width {
                    lines.push(Vec::new());
                    row += 1;
                    col = 0;
                }
                stops.push(stop(offset, row, col));
                let style = if selected(offset) {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                push_span(&mut lines, Span::styled(display, style));
                col += w;
            }
            Unit::Chip {
                offset,
                text,
                style,
            } => {
                let w = text.width();
                if col > 0 && col + w > width {
                    lines.push(Vec::new());
                    row += 1;
                    col = 0;
                }
                stops.push(stop(offset, row, col));
                let style = if selected(offset) {
                    style.add_modifier(Modifier::REVERSED)
                } else {
                    style
                };
                push_span(&mut lines, Span::styled(text, style));
                col += w;
            }
        }
    }

    if col >= width {
        lines.push(Vec::new());
        row += 1;
        col = 0;
    }
    stops.push(stop(end, row, col));

    OverlayLayout {
        lines: lines.into_iter().map(Line::from).collect(),
        stops,
    }
}

fn stop(offset: usize, row: usize, col: usize) -> CaretStop {
    CaretStop {
        offset,
        row: row as u16,
        col: col as u16,
    }
}

fn push_span(lines: &mut [Vec<Span<'static>>], span: Span<'static>) {
    if let Some(line) = lines.last_mut() {
        line.push(span);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_core::EntityCatalog;
    use quill_core::segment;
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

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn chip_is_one_unit_and_caret_skips_it() {
        let buffer = "ab{{@::Character::7}}cd";
        let segments = segment(buffer, &catalog());
        let layout = layout(&segments, buffer.len(), 40, None);
        assert_eq!(layout.lines.len(), 1);
        assert_eq!(line_text(&layout.lines[0]), "ab Ada cd");
        assert_eq!(layout.caret_position(2), (2, 0));
        assert_eq!(layout.caret_position(21), (7, 0));
        assert_eq!(layout.caret_position(buffer.len()), (9, 0));
    }

    #[test]
    fn chip_wraps_whole() {
        let buffer = "abcdef{{@::Character::7}}";
        let segments = segment(buffer, &catalog());
        let layout = layout(&segments, buffer.len(), 8, None);
        let texts: Vec<String> = layout.lines.iter().map(line_text).collect();
        assert_eq!(texts, vec!["abcdef".to_string(), " Ada ".to_string()]);
        assert_eq!(layout.caret_position(6), (0, 1));
        assert_eq!(layout.caret_position(buffer.len()), (5, 1));
    }

    #[test]
    fn newlines_start_new_rows() {
        let buffer = "a\nb";
        let segments = segment(buffer, &EntityCatalog::default());
        let layout = layout(&segments, buffer.len(), 10, None);
        assert_eq!(layout.height(), 2);
        assert_eq!(layout.caret_position(1), (1, 0));
        assert_eq!(layout.caret_position(2), (0, 1));
        assert_eq!(layout.caret_position(3), (1, 1));
    }

    #[test]
    fn caret_at_full_width_moves_to_next_row() {
        let buffer = "abcd";
        let segments = segment(buffer, &EntityCatalog::default());
        let layout = layout(&segments, buffer.len(), 4, None);
        assert_eq!(layout.height(), 2);
        assert_eq!(layout.caret_position(4), (0, 1));
    }

    #[test]
    fn empty_buffer_has_single_row_and_origin_caret() {
        let layout = layout(&[], 0, 10, None);
        assert_eq!(layout.height(), 1);
        assert_eq!(layout.caret_position(0), (0, 0));
    }

    #[test]
    fn selection_is_reversed() {
        let buffer = "ab{{@::Character::7}}";
        let segments = segment(buffer, &catalog());
        let layout = layout(&segments, buffer.len(), 40, Some(1..21));
        let spans = &layout.lines[0].spans;
        assert!(!spans[0].style.add_modifier.contains(Modifier::REVERSED));
        assert!(spans[1].style.add_modifier.contains(Modifier::REVERSED));
        assert!(spans[2].style.add_modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn unresolved_chip_uses_dim_style() {
        let style = chip_style(RefKind::Memo, false);
        assert!(style.add_modifier.contains(Modifier::DIM));
        assert_eq!(style.fg, Some(Color::Yellow));
    }
}
