use quill_core::EntityCatalog;
use quill_core::RefKind;
use ratatui::buffer::Buffer;
use ratatui::layout::Constraint;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::symbols::border::QUADRANT_LEFT_HALF;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Cell;
use ratatui::widgets::Clear;
use ratatui::widgets::Row;
use ratatui::widgets::Table;
use ratatui::widgets::Widget;
use ratatui::widgets::WidgetRef;
use strum::IntoEnumIterator;

use crate::overlay::kind_color;

/// Wide enough for the longest category name.
const FIRST_COLUMN_WIDTH: u16 = 16;

/// Menu of reference categories opened by the trigger character.
pub(crate) struct CategoryPopup {
    categories: Vec<(RefKind, usize)>,
    selected_idx: usize,
}

impl CategoryPopup {
    /// Build the menu, recording how many entries each category has.
    pub(crate) fn new(catalog: &EntityCatalog) -> Self {
        let categories = RefKind::iter()
            .map(|kind| (kind, catalog.entries(kind).len()))
            .collect();
        Self {
            categories,
            selected_idx: 0,
        }
    }

    /// Rows for the categories plus the border.
    pub(crate) fn calculate_required_height(&self) -> u16 {
        self.categories.len() as u16 + 2
    }

    /// Move the selection cursor one step up, wrapping at the top.
    pub(crate) fn move_up(&mut self) {
        let len = self.categories.len();
        if len == 0 {
            return;
        }
        self.selected_idx = (self.selected_idx + len - 1) % len;
    }

    /// Move the selection cursor one step down, wrapping at the bottom.
    pub(crate) fn move_down(&mut self) {
        let len = self.categories.len();
        if len == 0 {
            return;
        }
        self.selected_idx = (self.selected_idx + 1) % len;
    }

    pub(crate) fn selected_kind(&self) -> Option<RefKind> {
        self.categories.get(self.selected_idx).map(|(kind, _)| *kind)
    }
}

impl WidgetRef for CategoryPopup {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let rows: Vec<Row> = self
            .categories
            .iter()
            .enumerate()
            .map(|(idx, (kind, count))| {
                let marker = if idx == self.selected_idx {
                    Span::from("›").fg(ratatui::style::Color::LightCyan)
                } else {
                    Span::from(QUADRANT_LEFT_HALF).dark_gray()
                };
                let mut name = Span::styled(
                    kind.display_name(),
                    Style::default().fg(kind_color(*kind)),
                );
                if idx == self.selected_idx {
                    name = name.bold();
                }
                let count = Span::from(match count {
                    1 => "1 entry".to_string(),
                    n => format!("{n} entries"),
                })
                .dim();
                Row::new(vec![
                    Cell::from(Line::from(vec![marker, Span::raw(" "), name])),
                    Cell::from(count),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [Constraint::Length(FIRST_COLUMN_WIDTH), Constraint::Min(6)],
        )
        .column_spacing(1)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().add_modifier(Modifier::DIM))
                .title("Insert reference"),
        );

        table.render(area, buf);
    }
}
