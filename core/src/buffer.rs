//! Text buffer with a caret that treats reference tokens as atomic units.
//!
//! The buffer owns the raw grammar-encoded string. Tokens are rediscovered
//! with [`grammar::decode`] after every mutation, so a token typed by hand
//! becomes atomic the moment its closing `}}` is entered. The caret (and the
//! selection anchor, when present) only ever rests on a token boundary: after
//! each operation it is snapped to the nearest boundary of any token that
//! would otherwise contain it.
//!
//! Mutating operations return `true` when the value changed. Owners use this
//! to emit exactly one change notification per committed edit.

use std::ops::Range;

use quill_protocol::ChapterVariant;
use quill_protocol::RefKind;
use quill_protocol::Reference;
use unicode_segmentation::UnicodeSegmentation;

use crate::grammar;
use crate::grammar::ReferenceToken;

/// Caret motions understood by [`TokenBuffer::move_caret`] and
/// [`TokenBuffer::extend_selection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretMove {
    Left,
    Right,
    WordLeft,
    WordRight,
    LineStart,
    LineEnd,
    Up,
    Down,
    BufferStart,
    BufferEnd,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenBuffer {
    text: String,
    /// Byte offset of the caret. Always a char boundary and never strictly
    /// inside a token.
    caret: usize,
    /// Other end of the selection, with the same invariants as `caret`.
    anchor: Option<usize>,
    tokens: Vec<ReferenceToken>,
}

impl TokenBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrate from a previously stored value. The caret starts at the end.
    pub fn from_value(value: &str) -> Self {
        let mut buffer = Self::new();
        buffer.set_value(value);
        buffer
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn tokens(&self) -> &[ReferenceToken] {
        &self.tokens
    }

    /// Replace the whole value, e.g. when the owner pushes a new value in.
    pub fn set_value(&mut self, value: &str) -> bool {
        let changed = self.text != value;
        self.text = value.to_string();
        self.tokens = grammar::decode(&self.text);
        self.anchor = None;
        self.caret = self.text.len();
        changed
    }

    /// Place the caret, clamping to the buffer and to token boundaries.
    pub fn set_caret(&mut self, pos: usize) {
        self.anchor = None;
        self.caret = self.normalize_pos(pos);
    }

    /// The selected byte range, if a non-empty selection exists.
    pub fn selection(&self) -> Option<Range<usize>> {
        let anchor = self.anchor?;
        match anchor.cmp(&self.caret) {
            std::cmp::Ordering::Less => Some(anchor..self.caret),
            std::cmp::Ordering::Greater => Some(self.caret..anchor),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn select_all(&mut self) {
        self.anchor = Some(0);
        self.caret = self.text.len();
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// The character immediately before the caret, if any.
    pub fn char_before_caret(&self) -> Option<char> {
        self.text[..self.caret].chars().next_back()
    }

    // ---------------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------------

    pub fn move_caret(&mut self, motion: CaretMove) {
        if let Some(selection) = self.selection() {
            match motion {
                CaretMove::Left => {
                    self.set_caret(selection.start);
                    return;
                }
                CaretMove::Right => {
                    self.set_caret(selection.end);
                    return;
                }
                _ => {}
            }
        }
        self.anchor = None;
        self.caret = self.target(motion);
    }

    pub fn extend_selection(&mut self, motion: CaretMove) {
        if self.anchor.is_none() {
            self.anchor = Some(self.caret);
        }
        self.caret = self.target(motion);
    }

    fn target(&self, motion: CaretMove) -> usize {
        match motion {
            CaretMove::Left => self.prev_boundary(self.caret),
            CaretMove::Right => self.next_boundary(self.caret),
            CaretMove::WordLeft => self.word_start_before(self.caret),
            CaretMove::WordRight => self.word_end_after(self.caret),
            CaretMove::LineStart => self.line_start(self.caret),
            CaretMove::LineEnd => self.line_end(self.caret),
            CaretMove::Up => self.vertical_target(-1),
            CaretMove::Down => self.vertical_target(1),
            CaretMove::BufferStart => 0,
            CaretMove::BufferEnd => self.text.len(),
        }
    }

    /// Previous caret stop: the start of a token ending at `pos`, otherwise
    /// the previous grapheme boundary within the plain text before `pos`.
    fn prev_boundary(&self, pos: usize) -> usize {
        if let Some(token) = grammar::token_ending_at(&self.tokens, pos) {
            return token.start();
        }
        // Graphemes are segmented per plain-text run so a combining mark
        // after `}}` never clusters with the token's closing brace.
        let run_start = self.run_start(pos);
        self.text[run_start..pos]
            .grapheme_indices(true)
            .next_back()
            .map(|(idx, _)| run_start + idx)
            .unwrap_or(run_start)
    }

    /// Next caret stop: the end of a token starting at `pos`, otherwise the
    /// next grapheme boundary within the plain text after `pos`.
    fn next_boundary(&self, pos: usize) -> usize {
        if let Some(token) = grammar::token_starting_at(&self.tokens, pos) {
            return token.end();
        }
        let run_end = self.run_end(pos);
        self.text[pos..run_end]
            .graphemes(true)
            .next()
            .map(|g| pos + g.len())
            .unwrap_or(run_end)
    }

    /// Start of the plain-text run containing `pos`: the end of the last
    /// token at or before it.
    fn run_start(&self, pos: usize) -> usize {
        self.tokens
            .iter()
            .rev()
            .map(ReferenceToken::end)
            .find(|end| *end <= pos)
            .unwrap_or(0)
    }

    /// End of the plain-text run containing `pos`: the start of the first
    /// token at or after it.
    fn run_end(&self, pos: usize) -> usize {
        self.tokens
            .iter()
            .map(ReferenceToken::start)
            .find(|start| *start >= pos)
            .unwrap_or(self.text.len())
    }

    /// Word-wise movement backwards. A token counts as one word.
    fn word_start_before(&self, pos: usize) -> usize {
        let mut pos = pos;
        while pos > 0 && grammar::token_ending_at(&self.tokens, pos).is_none() {
            match self.text[..pos].char_indices().next_back() {
                Some((idx, ch)) if ch.is_whitespace() => pos = idx,
                _ => break,
            }
        }
        if let Some(token) = grammar::token_ending_at(&self.tokens, pos) {
            return token.start();
        }
        while pos > 0 && grammar::token_ending_at(&self.tokens, pos).is_none() {
            match self.text[..pos].char_indices().next_back() {
                Some((idx, ch)) if !ch.is_whitespace() => pos = idx,
                _ => break,
            }
        }
        pos
    }

    /// Word-wise movement forwards. A token counts as one word.
    fn word_end_after(&self, pos: usize) -> usize {
        let len = self.text.len();
        let mut pos = pos;
        while pos < len && grammar::token_starting_at(&self.tokens, pos).is_none() {
            match self.text[pos..].chars().next() {
                Some(ch) if ch.is_whitespace() => pos += ch.len_utf8(),
                _ => break,
            }
        }
        if let Some(token) = grammar::token_starting_at(&self.tokens, pos) {
            return token.end();
        }
        while pos < len && grammar::token_starting_at(&self.tokens, pos).is_none() {
            match self.text[pos..].chars().next() {
                Some(ch) if !ch.is_whitespace() => pos += ch.len_utf8(),
                _ => break,
            }
        }
        pos
    }

    fn line_start(&self, pos: usize) -> usize {
        self.text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    fn line_end(&self, pos: usize) -> usize {
        self.text[pos..]
            .find('\n')
            .map(|i| pos + i)
            .unwrap_or(self.text.len())
    }

    /// Same column on the previous (`-1`) or next (`1`) line, counted in
    /// caret stops so a token is one column wide. Clamped to the target
    /// line's length.
    fn vertical_target(&self, direction: i8) -> usize {
        let start = self.line_start(self.caret);
        let col = self.column_of(start, self.caret);
        let (target_start, target_end) = if direction < 0 {
            if start == 0 {
                return 0;
            }
            let prev_end = start - 1;
            (self.line_start(prev_end), prev_end)
        } else {
            let end = self.line_end(self.caret);
            if end == self.text.len() {
                return self.text.len();
            }
            let next_start = end + 1;
            (next_start, self.line_end(next_start))
        };
        let mut pos = target_start;
        for _ in 0..col {
            if pos >= target_end {
                break;
            }
            pos = self.next_boundary(pos).min(target_end);
        }
        pos
    }

    /// Number of caret stops between `line_start` and `pos`.
    fn column_of(&self, line_start: usize, pos: usize) -> usize {
        let mut cursor = line_start;
        let mut col = 0;
        while cursor < pos {
            cursor = self.next_boundary(cursor);
            col += 1;
        }
        col
    }

    // ---------------------------------------------------------------------
    // Editing
    // ---------------------------------------------------------------------

    /// Insert `text` at the caret, replacing the selection if there is one.
    pub fn insert_text(&mut self, text: &str) -> bool {
        let range = self.selection().unwrap_or(self.caret..self.caret);
        if text.is_empty() && range.is_empty() {
            return false;
        }
        self.splice(range, text);
        true
    }

    /// Delete the selection, the whole token ending at the caret, or one
    /// grapheme, in that order of preference.
    pub fn backspace(&mut self) -> bool {
        if let Some(selection) = self.selection() {
            self.splice(selection, "");
            return true;
        }
        if self.caret == 0 {
            return false;
        }
        let start = self.prev_boundary(self.caret);
        self.splice(start..self.caret, "");
        true
    }

    /// Mirror of [`backspace`](Self::backspace) for the text after the caret.
    pub fn delete_forward(&mut self) -> bool {
        if let Some(selection) = self.selection() {
            self.splice(selection, "");
            return true;
        }
        if self.caret >= self.text.len() {
            return false;
        }
        let end = self.next_boundary(self.caret);
        self.splice(self.caret..end, "");
        true
    }

    pub fn delete_word_backward(&mut self) -> bool {
        if let Some(selection) = self.selection() {
            self.splice(selection, "");
            return true;
        }
        let start = self.word_start_before(self.caret);
        if start == self.caret {
            return false;
        }
        self.splice(start..self.caret, "");
        true
    }

    /// Delete to the end of the line; at the end of a line, join the next one.
    pub fn kill_to_line_end(&mut self) -> bool {
        let mut end = self.line_end(self.caret);
        if end == self.caret {
            if end >= self.text.len() {
                return false;
            }
            end += 1;
        }
        self.splice(self.caret..end, "");
        true
    }

    /// Delete to the start of the line; at the start of a line, join the
    /// previous one.
    pub fn kill_to_line_start(&mut self) -> bool {
        let mut start = self.line_start(self.caret);
        if start == self.caret {
            if start == 0 {
                return false;
            }
            start -= 1;
        }
        self.splice(start..self.caret, "");
        true
    }

    /// Insert one placeholder per id (space-joined) at the caret as a single
    /// edit. An empty id list is a no-op.
    pub fn insert_reference(
        &mut self,
        kind: RefKind,
        ids: &[u64],
        variant: Option<ChapterVariant>,
    ) -> bool {
        if ids.is_empty() {
            tracing::debug!("insert_reference for {kind} with no ids; nothing to do");
            return false;
        }
        let references: Vec<Reference> = ids
            .iter()
            .map(|id| Reference::new(kind, *id, variant))
            .collect();
        let encoded = grammar::encode_all(&references);
        self.insert_text(&encoded)
    }

    /// Replace `range` with `text`. The range is clamped to the buffer and
    /// widened so it never cuts through a token. The caret ends up after the
    /// inserted text.
    pub fn replace_range(&mut self, range: Range<usize>, text: &str) -> bool {
        let start = self.floor_char_boundary(range.start.min(self.text.len()));
        let end = self.floor_char_boundary(range.end.min(self.text.len()).max(start));
        let start = grammar::token_containing(&self.tokens, start)
            .map(|t| t.start())
            .unwrap_or(start);
        let end = grammar::token_containing(&self.tokens, end)
            .map(|t| t.end())
            .unwrap_or(end);
        if start == end && text.is_empty() {
            return false;
        }
        self.splice(start..end, text);
        true
    }

    /// Raw splice shared by every edit. Rescans tokens and re-establishes the
    /// caret invariant.
    fn splice(&mut self, range: Range<usize>, text: &str) {
        self.text.replace_range(range.clone(), text);
        self.tokens = grammar::decode(&self.text);
        self.anchor = None;
        self.caret = self.snap_to_boundary(range.start + text.len());
    }

    fn normalize_pos(&self, pos: usize) -> usize {
        let pos = self.floor_char_boundary(pos.min(self.text.len()));
        self.snap_to_boundary(pos)
    }

    fn floor_char_boundary(&self, pos: usize) -> usize {
        let mut pos = pos;
        while pos > 0 && !self.text.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }

    /// Move `pos` out of any token that strictly contains it, to whichever
    /// boundary is closer (the end on a tie).
    fn snap_to_boundary(&self, pos: usize) -> usize {
        match grammar::token_containing(&self.tokens, pos) {
            Some(token) if pos - token.start() < token.end() - pos => token.start(),
            Some(token) => token.end(),
            None => pos,
        }
    }
}
