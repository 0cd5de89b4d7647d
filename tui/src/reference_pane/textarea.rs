use std::ops::Range;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use quill_core::CaretMove;
use quill_core::ChapterVariant;
use quill_core::EntityCatalog;
use quill_core::RefKind;
use quill_core::TokenBuffer;
use quill_core::segment;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;

use crate::overlay;
use crate::overlay::OverlayLayout;

/// Editable text surface over a [`TokenBuffer`]. Keys map to buffer edits and
/// drawing goes through [`overlay::layout`], so chips and the terminal cursor
/// share one layout.
#[derive(Debug, Default)]
pub(crate) struct TextArea {
    buffer: TokenBuffer,
}

impl TextArea {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn text(&self) -> &str {
        self.buffer.value()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub(crate) fn caret(&self) -> usize {
        self.buffer.caret()
    }

    pub(crate) fn char_before_caret(&self) -> Option<char> {
        self.buffer.char_before_caret()
    }

    pub(crate) fn set_text(&mut self, text: &str) -> bool {
        self.buffer.set_value(text)
    }

    pub(crate) fn insert_str(&mut self, text: &str) -> bool {
        self.buffer.insert_text(text)
    }

    pub(crate) fn insert_reference(
        &mut self,
        kind: RefKind,
        ids: &[u64],
        variant: Option<ChapterVariant>,
    ) -> bool {
        self.buffer.insert_reference(kind, ids, variant)
    }

    pub(crate) fn replace_range(&mut self, range: Range<usize>, text: &str) -> bool {
        self.buffer.replace_range(range, text)
    }

    /// Apply one key press. Returns `true` when the text changed; pure caret
    /// motions return `false`.
    pub(crate) fn input(&mut self, key_event: KeyEvent) -> bool {
        let KeyEvent {
            code, modifiers, ..
        } = key_event;
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        let alt = modifiers.contains(KeyModifiers::ALT);
        let shift = modifiers.contains(KeyModifiers::SHIFT);
        let ctrl_only = ctrl && !alt;
        let alt_only = alt && !ctrl;

        match code {
            KeyCode::Char('h') if ctrl_only => self.buffer.backspace(),
            KeyCode::Char('w') if ctrl_only => self.buffer.delete_word_backward(),
            KeyCode::Char('k') if ctrl_only => self.buffer.kill_to_line_end(),
            KeyCode::Char('u') if ctrl_only => self.buffer.kill_to_line_start(),
            KeyCode::Char('a') if ctrl_only => self.motion(CaretMove::LineStart, false),
            KeyCode::Char('e') if ctrl_only => self.motion(CaretMove::LineEnd, false),
            KeyCode::Char('b') if ctrl_only => self.motion(CaretMove::Left, false),
            KeyCode::Char('f') if ctrl_only => self.motion(CaretMove::Right, false),
            KeyCode::Char('b') if alt_only => self.motion(CaretMove::WordLeft, false),
            KeyCode::Char('f') if alt_only => self.motion(CaretMove::WordRight, false),
            KeyCode::Char(c) if is_text_input(modifiers) => {
                let mut tmp = [0u8; 4];
                self.buffer.insert_text(c.encode_utf8(&mut tmp))
            }
            KeyCode::Backspace if ctrl || alt => self.buffer.delete_word_backward(),
            KeyCode::Backspace => self.buffer.backspace(),
            KeyCode::Delete => self.buffer.delete_forward(),
            KeyCode::Enter => self.buffer.insert_text("\n"),
            KeyCode::Tab => self.buffer.insert_text("\t"),
            KeyCode::Left if ctrl || alt => self.motion(CaretMove::WordLeft, shift),
            KeyCode::Left => self.motion(CaretMove::Left, shift),
            KeyCode::Right if ctrl || alt => self.motion(CaretMove::WordRight, shift),
            KeyCode::Right => self.motion(CaretMove::Right, shift),
            KeyCode::Up => self.motion(CaretMove::Up, shift),
            KeyCode::Down => self.motion(CaretMove::Down, shift),
            KeyCode::Home if ctrl => self.motion(CaretMove::BufferStart, shift),
            KeyCode::Home => self.motion(CaretMove::LineStart, shift),
            KeyCode::End if ctrl => self.motion(CaretMove::BufferEnd, shift),
            KeyCode::End => self.motion(CaretMove::LineEnd, shift),
            KeyCode::Esc => {
                self.buffer.clear_selection();
                false
            }
            _ => false,
        }
    }

    fn motion(&mut self, motion: CaretMove, extend: bool) -> bool {
        if extend {
            self.buffer.extend_selection(motion);
        } else {
            self.buffer.move_caret(motion);
        }
        false
    }

    fn layout(&self, catalog: &EntityCatalog, width: u16) -> OverlayLayout {
        let segments = segment(self.buffer.value(), catalog);
        overlay::layout(
            &segments,
            self.buffer.value().len(),
            width,
            self.buffer.selection(),
        )
    }

    pub(crate) fn desired_height(&self, catalog: &EntityCatalog, width: u16) -> u16 {
        self.layout(catalog, width).height()
    }

    /// Screen cell of the caret when the text is drawn into `area`.
    pub(crate) fn cursor_pos(&self, catalog: &EntityCatalog, area: Rect) -> Option<(u16, u16)> {
        if area.width == 0 || area.height == 0 {
            return None;
        }
        let layout = self.layout(catalog, area.width);
        let (col, row) = layout.caret_position(self.buffer.caret());
        let scroll = Self::scroll_offset(row, area.height);
        let x = area.x + col.min(area.width.saturating_sub(1));
        let y = area.y + row.saturating_sub(scroll);
        Some((x, y))
    }

    pub(crate) fn render(&self, catalog: &EntityCatalog, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let layout = self.layout(catalog, area.width);
        let (_, caret_row) = layout.caret_position(self.buffer.caret());
        let scroll = Self::scroll_offset(caret_row, area.height);
        Paragraph::new(layout.lines)
            .scroll((scroll, 0))
            .render(area, buf);
    }

    /// First visible row so that the caret row stays on screen.
    fn scroll_offset(caret_row: u16, height: u16) -> u16 {
        caret_row.saturating_sub(height.saturating_sub(1))
    }
}

/// Whether a character key carries text rather than a shortcut. AltGr is
/// reported as Ctrl+Alt on Windows, so that combination still types.
pub(crate) fn is_text_input(modifiers: KeyModifiers) -> bool {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let alt = modifiers.contains(KeyModifiers::ALT);
    ctrl == alt
}
