use std::collections::HashSet;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use quill_core::ChapterVariant;
use quill_core::RefKind;
use quill_core::catalog_search;
use quill_core::catalog_search::EntityMatch;
use quill_protocol::EntitySummary;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthStr;

use crate::overlay::kind_color;

use super::CancellationEvent;
use super::ReferencePane;
use super::pane_view::PaneView;
use super::popup_consts::MAX_POPUP_ROWS;
use super::scroll_state::ScrollState;
use super::selection_popup_common::GenericDisplayRow;
use super::selection_popup_common::render_rows;
use super::textarea::is_text_input;

const FILTER_LABEL: &str = "Filter: ";
const PREFIX: &str = "▌ ";

/// Modal list of one category's entities. Typing filters, Space toggles,
/// Enter inserts the toggled entries (or the highlighted one when nothing is
/// toggled) and Esc leaves the buffer untouched.
pub(crate) struct EntityPickerView {
    kind: RefKind,
    entries: Vec<EntitySummary>,
    /// Ids already referenced in the buffer.
    referenced: HashSet<u64>,
    query: String,
    matches: Vec<EntityMatch>,
    /// Toggled ids in the order they were toggled.
    toggled: Vec<u64>,
    variant: ChapterVariant,
    state: ScrollState,
    complete: bool,
}

impl EntityPickerView {
    pub(crate) fn new(kind: RefKind, entries: Vec<EntitySummary>, referenced: HashSet<u64>) -> Self {
        let mut view = Self {
            kind,
            entries,
            referenced,
            query: String::new(),
            matches: Vec::new(),
            toggled: Vec::new(),
            variant: ChapterVariant::default(),
            state: ScrollState::new(),
            complete: false,
        };
        view.refilter();
        view
    }

    fn refilter(&mut self) {
        self.matches = catalog_search::search(&self.query, &self.entries);
        let len = self.matches.len();
        self.state.selected_idx = if len == 0 { None } else { Some(0) };
        self.state.scroll_top = 0;
        self.state.clamp_selection(len);
    }

    fn move_up(&mut self) {
        let len = self.matches.len();
        self.state.move_up_wrap(len);
        self.state.ensure_visible(len, MAX_POPUP_ROWS.min(len));
    }

    fn move_down(&mut self) {
        let len = self.matches.len();
        self.state.move_down_wrap(len);
        self.state.ensure_visible(len, MAX_POPUP_ROWS.min(len));
    }

    fn highlighted_id(&self) -> Option<u64> {
        self.state
            .selected_idx
            .and_then(|idx| self.matches.get(idx))
            .map(|m| m.entity.id)
    }

    fn toggle_highlighted(&mut self) {
        let Some(id) = self.highlighted_id() else {
            return;
        };
        if let Some(pos) = self.toggled.iter().position(|t| *t == id) {
            self.toggled.remove(pos);
        } else {
            self.toggled.push(id);
        }
    }

    /// Ids an Enter press would insert.
    fn confirmed_ids(&self) -> Vec<u64> {
        if self.toggled.is_empty() {
            self.highlighted_id().into_iter().collect()
        } else {
            self.toggled.clone()
        }
    }

    fn accept(&mut self, pane: &mut ReferencePane) {
        let ids = self.confirmed_ids();
        let variant = self.kind.supports_variant().then_some(self.variant);
        tracing::debug!("inserting {} {} reference(s)", ids.len(), self.kind);
        pane.insert_reference(self.kind, &ids, variant);
        self.complete = true;
    }

    fn cancel(&mut self) {
        // Close without touching the buffer.
        self.complete = true;
    }

    fn title(&self) -> String {
        format!("Insert {}", self.kind.display_name().to_lowercase())
    }

    fn subtitle_spans(&self) -> Vec<Span<'static>> {
        let mut spans = vec![Self::dim_prefix_span(), Span::raw(FILTER_LABEL)];
        if self.query.is_empty() {
            spans.push(Span::styled(
                "type to filter",
                Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
            ));
        } else {
            spans.push(Span::raw(self.query.clone()));
        }
        if self.kind.supports_variant() {
            spans.push(Span::styled(
                format!("  [{}]", self.variant.token()),
                Style::default().fg(kind_color(self.kind)),
            ));
        }
        spans
    }

    fn footer_hint(&self) -> &'static str {
        if self.kind.supports_variant() {
            "Space select | Enter insert | Tab full/summary | Esc cancel"
        } else {
            "Space select | Enter insert | Esc cancel"
        }
    }

    fn dim_prefix_span() -> Span<'static> {
        Span::styled(PREFIX, Style::default().add_modifier(Modifier::DIM))
    }

    fn display_rows(&self) -> Vec<GenericDisplayRow> {
        self.matches
            .iter()
            .map(|m| {
                let checked = self.toggled.contains(&m.entity.id);
                let is_current = self.referenced.contains(&m.entity.id);
                GenericDisplayRow {
                    prefix: if checked { "[x] " } else { "[ ] " }.to_string(),
                    name: m.entity.name.clone(),
                    match_indices: (!m.indices.is_empty()).then(|| m.indices.clone()),
                    is_current,
                    description: is_current.then(|| "in text".to_string()),
                }
            })
            .collect()
    }
}

impl PaneView for EntityPickerView {
    fn handle_key_event(&mut self, pane: &mut ReferencePane, key_event: KeyEvent) {
        match key_event {
            KeyEvent {
                code: KeyCode::Up, ..
            } => self.move_up(),
            KeyEvent {
                code: KeyCode::Down,
                ..
            } => self.move_down(),
            KeyEvent {
                code: KeyCode::Esc, ..
            } => self.cancel(),
            KeyEvent {
                code: KeyCode::Enter,
                ..
            } => self.accept(pane),
            KeyEvent {
                code: KeyCode::Char(' '),
                modifiers: KeyModifiers::NONE,
                ..
            } => self.toggle_highlighted(),
            KeyEvent {
                code: KeyCode::Tab, ..
            } if self.kind.supports_variant() => {
                self.variant = self.variant.toggled();
            }
            KeyEvent {
                code: KeyCode::Backspace,
                ..
            } => {
                if self.query.pop().is_some() {
                    self.refilter();
                }
            }
            KeyEvent {
                code: KeyCode::Char(c),
                modifiers,
                ..
            } if is_text_input(modifiers) => {
                self.query.push(c);
                self.refilter();
            }
            _ => {}
        }
    }

    fn handle_paste(&mut self, pasted: String) -> bool {
        let line = pasted.lines().next().unwrap_or_default();
        self.query.push_str(line);
        self.refilter();
        true
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn on_ctrl_c(&mut self, _pane: &mut ReferencePane) -> CancellationEvent {
        self.cancel();
        CancellationEvent::Handled
    }

    fn desired_height(&self, _width: u16) -> u16 {
        let rows = self.matches.len().clamp(1, MAX_POPUP_ROWS) as u16;
        // title, subtitle, spacer, rows, spacer, footer
        rows + 5
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let title_area = Rect {
            height: 1,
            ..area
        };
        Paragraph::new(Line::from(vec![
            Self::dim_prefix_span(),
            Span::styled(
                self.title(),
                Style::default()
                    .fg(kind_color(self.kind))
                    .add_modifier(Modifier::BOLD),
            ),
        ]))
        .render(title_area, buf);

        let mut next_y = area.y.saturating_add(1);
        if next_y < area.bottom() {
            let subtitle_area = Rect {
                y: next_y,
                height: 1,
                ..area
            };
            Paragraph::new(Line::from(self.subtitle_spans())).render(subtitle_area, buf);
            next_y = next_y.saturating_add(2);
        }

        let footer_reserved = 2;
        let rows_area = Rect {
            y: next_y.min(area.bottom()),
            height: area
                .height
                .saturating_sub(next_y.saturating_sub(area.y))
                .saturating_sub(footer_reserved),
            ..area
        };
        if rows_area.height > 0 {
            let empty_message = format!("no {} match", self.kind.display_name().to_lowercase());
            render_rows(
                rows_area,
                buf,
                &self.display_rows(),
                &self.state,
                MAX_POPUP_ROWS,
                &empty_message,
            );
        }

        if area.height >= 2 {
            let footer_area = Rect {
                y: area.bottom() - 1,
                height: 1,
                ..area
            };
            Paragraph::new(Line::from(Span::styled(
                self.footer_hint(),
                Style::default().add_modifier(Modifier::DIM),
            )))
            .render(footer_area, buf);
        }
    }

    fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        if area.height < 2 {
            return None;
        }
        let offset = PREFIX.width() + FILTER_LABEL.width() + self.query.width();
        let x = area.x + (offset as u16).min(area.width.saturating_sub(1));
        Some((x, area.y + 1))
    }
}
