use std::collections::HashSet;
use std::sync::Arc;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use quill_core::ChapterVariant;
use quill_core::EntityCatalog;
use quill_core::RefKind;
use quill_core::config::Config;
use quill_core::grammar;
use ratatui::buffer::Buffer;
use ratatui::layout::Alignment;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;
use ratatui::widgets::WidgetRef;

use super::category_popup::CategoryPopup;
use super::popup_consts::CATEGORY_MENU_WIDTH;
use super::textarea::TextArea;

use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;

/// Result returned when the user interacts with the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InputResult {
    Submitted(String),
    /// A category was chosen from the menu; the owner opens its picker.
    OpenPicker(RefKind),
    None,
}

/// Display settings for the hosted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldConfig {
    pub label: String,
    pub placeholder: Option<String>,
    pub description: Option<String>,
    pub required: bool,
    pub trigger: char,
}

impl From<&Config> for FieldConfig {
    fn from(config: &Config) -> Self {
        Self {
            label: config.label.clone(),
            placeholder: config.placeholder.clone(),
            description: config.description.clone(),
            required: config.required,
            trigger: config.trigger,
        }
    }
}

/// Category menu opened by typing the trigger.
struct MenuState {
    popup: CategoryPopup,
    /// Byte offset of the trigger character that opened the menu.
    trigger_at: usize,
}

/// The reference-aware text field: buffer, chips, trigger menu.
pub(crate) struct ReferenceInput {
    textarea: TextArea,
    menu: Option<MenuState>,
    app_event_tx: AppEventSender,
    catalog: Arc<EntityCatalog>,
    field: FieldConfig,
}

impl ReferenceInput {
    pub(crate) fn new(
        field: FieldConfig,
        catalog: Arc<EntityCatalog>,
        app_event_tx: AppEventSender,
    ) -> Self {
        Self {
            textarea: TextArea::new(),
            menu: None,
            app_event_tx,
            catalog,
            field,
        }
    }

    pub(crate) fn value(&self) -> &str {
        self.textarea.text()
    }

    /// Replace the value from outside (hydration). The owner already knows the
    /// value, so no change notification is sent.
    pub(crate) fn set_value(&mut self, value: &str) {
        self.menu = None;
        self.textarea.set_text(value);
    }

    pub(crate) fn is_menu_open(&self) -> bool {
        self.menu.is_some()
    }

    /// Close the category menu, leaving the trigger in the text.
    pub(crate) fn dismiss_menu(&mut self) {
        self.menu = None;
    }

    /// Ids of `kind` currently referenced in the buffer.
    pub(crate) fn referenced_ids(&self, kind: RefKind) -> HashSet<u64> {
        grammar::references(self.value())
            .into_iter()
            .filter(|r| r.kind() == kind)
            .map(|r| r.id())
            .collect()
    }

    /// Handle a key event coming from the pane.
    pub(crate) fn handle_key_event(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        if self.menu.is_some() {
            self.handle_key_event_with_menu(key_event)
        } else {
            self.handle_key_event_without_menu(key_event)
        }
    }

    fn handle_key_event_with_menu(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        let Some(menu) = self.menu.as_mut() else {
            return self.handle_key_event_without_menu(key_event);
        };

        match key_event {
            KeyEvent {
                code: KeyCode::Up, ..
            } => {
                menu.popup.move_up();
                (InputResult::None, true)
            }
            KeyEvent {
                code: KeyCode::Down,
                ..
            } => {
                menu.popup.move_down();
                (InputResult::None, true)
            }
            KeyEvent {
                code: KeyCode::Esc, ..
            } => {
                self.menu = None;
                (InputResult::None, true)
            }
            KeyEvent {
                code: KeyCode::Enter | KeyCode::Tab,
                modifiers: KeyModifiers::NONE,
                ..
            } => {
                let kind = menu.popup.selected_kind();
                let trigger_at = menu.trigger_at;
                self.menu = None;
                match kind {
                    Some(kind) => {
                        self.remove_trigger(trigger_at);
                        (InputResult::OpenPicker(kind), true)
                    }
                    None => (InputResult::None, true),
                }
            }
            _ => {
                // Anything else closes the menu and is handled as plain input.
                self.menu = None;
                self.handle_key_event_without_menu(key_event)
            }
        }
    }

    fn handle_key_event_without_menu(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        match key_event {
            KeyEvent {
                code: KeyCode::Enter,
                modifiers: KeyModifiers::NONE,
                ..
            } => (InputResult::Submitted(self.value().to_string()), true),
            KeyEvent {
                code: KeyCode::Char('j'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                if self.textarea.insert_str("\n") {
                    self.notify_value_changed();
                }
                (InputResult::None, true)
            }
            input => self.handle_input_basic(input),
        }
    }

    /// Handle generic key events that may modify the text.
    fn handle_input_basic(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        let chars_before = self.value().chars().count();
        if self.textarea.input(key_event) {
            self.notify_value_changed();
            self.sync_menu(chars_before);
        }
        (InputResult::None, true)
    }

    pub(crate) fn handle_paste(&mut self, pasted: String) -> bool {
        let pasted = pasted.replace("\r\n", "\n").replace('\r', "\n");
        self.menu = None;
        let chars_before = self.value().chars().count();
        if self.textarea.insert_str(&pasted) {
            self.notify_value_changed();
            self.sync_menu(chars_before);
        }
        true
    }

    /// Insert references at the caret as a single edit.
    pub(crate) fn insert_reference(
        &mut self,
        kind: RefKind,
        ids: &[u64],
        variant: Option<ChapterVariant>,
    ) -> bool {
        self.menu = None;
        let changed = self.textarea.insert_reference(kind, ids, variant);
        if changed {
            self.notify_value_changed();
        }
        changed
    }

    /// Open the menu when the edit grew the text by exactly the trigger
    /// character, typed just before the caret.
    fn sync_menu(&mut self, chars_before: usize) {
        let chars_after = self.value().chars().count();
        if chars_after != chars_before + 1
            || self.textarea.char_before_caret() != Some(self.field.trigger)
        {
            return;
        }
        let trigger_at = self.textarea.caret() - self.field.trigger.len_utf8();
        tracing::debug!("trigger typed at {trigger_at}; opening category menu");
        self.menu = Some(MenuState {
            popup: CategoryPopup::new(&self.catalog),
            trigger_at,
        });
    }

    fn remove_trigger(&mut self, trigger_at: usize) {
        let end = trigger_at + self.field.trigger.len_utf8();
        let still_there = self
            .value()
            .get(trigger_at..end)
            .is_some_and(|s| s.starts_with(self.field.trigger));
        if !still_there {
            tracing::warn!("trigger at {trigger_at} is gone; leaving text as is");
            return;
        }
        if self.textarea.replace_range(trigger_at..end, "") {
            self.notify_value_changed();
        }
    }

    fn notify_value_changed(&self) {
        self.app_event_tx
            .send(AppEvent::ValueChanged(self.value().to_string()));
    }

    fn block(&self) -> Block<'static> {
        let mut title = vec![Span::from(self.field.label.clone()).bold()];
        if self.field.required {
            title.push(Span::from(" *").red());
        }
        let hint = format!(
            "{} for references | Enter to submit | Ctrl+J for newline",
            self.field.trigger
        );
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(Line::from(title))
            .title_bottom(Line::from(hint).alignment(Alignment::Right).dim())
    }

    /// Split the block's inner area into the description row (if any) and
    /// the text rows.
    fn layout_inner(&self, area: Rect) -> (Option<Rect>, Rect) {
        let inner = self.block().inner(area);
        match &self.field.description {
            Some(_) if inner.height > 1 => (
                Some(Rect { height: 1, ..inner }),
                Rect {
                    y: inner.y + 1,
                    height: inner.height - 1,
                    ..inner
                },
            ),
            _ => (None, inner),
        }
    }

    pub(crate) fn desired_height(&self, width: u16) -> u16 {
        let inner_width = width.saturating_sub(2);
        let description = u16::from(self.field.description.is_some());
        self.textarea
            .desired_height(&self.catalog, inner_width)
            .saturating_add(description)
            .saturating_add(2)
    }

    pub(crate) fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        let (_, text_area) = self.layout_inner(area);
        self.textarea.cursor_pos(&self.catalog, text_area)
    }

    /// Where the category menu goes: just under the caret, or above it when
    /// there is no room below. Computed from the current layout every time.
    pub(crate) fn menu_area(&self, input_area: Rect, bounds: Rect) -> Option<Rect> {
        let menu = self.menu.as_ref()?;
        let (caret_x, caret_y) = self.cursor_pos(input_area)?;
        let width = CATEGORY_MENU_WIDTH.min(bounds.width);
        let height = menu.popup.calculate_required_height().min(bounds.height);
        let below = caret_y.saturating_add(1);
        let y = if below.saturating_add(height) <= bounds.bottom() {
            below
        } else {
            caret_y.saturating_sub(height).max(bounds.y)
        };
        // Line the menu up under the trigger, which sits just left of the caret.
        let x = caret_x
            .saturating_sub(1)
            .min(bounds.right().saturating_sub(width))
            .max(bounds.x);
        Some(Rect {
            x,
            y,
            width,
            height,
        })
    }

    pub(crate) fn render_menu(&self, input_area: Rect, bounds: Rect, buf: &mut Buffer) {
        if let (Some(menu), Some(area)) = (&self.menu, self.menu_area(input_area, bounds)) {
            menu.popup.render_ref(area, buf);
        }
    }
}

impl WidgetRef for &ReferenceInput {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let (description_area, text_area) = self.layout_inner(area);
        self.block().render(area, buf);
        if let (Some(description), Some(description_area)) =
            (&self.field.description, description_area)
        {
            Paragraph::new(Line::from(description.clone()).dim()).render(description_area, buf);
        }
        if self.textarea.is_empty() {
            if let Some(placeholder) = &self.field.placeholder {
                Paragraph::new(Line::from(placeholder.clone()).style(Style::default().dim()))
                    .render(text_area, buf);
            }
        } else {
            self.textarea.render(&self.catalog, text_area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_protocol::Chapter;
    use quill_protocol::Character;
    use std::sync::mpsc::Receiver;

    fn field() -> FieldConfig {
        FieldConfig {
            label: "Scene brief".to_string(),
            placeholder: Some("Describe the scene".to_string()),
            description: None,
            required: true,
            trigger: '@',
        }
    }

    fn catalog() -> Arc<EntityCatalog> {
        Arc::new(EntityCatalog {
            characters: vec![Character {
                id: 7,
                name: "Ada".to_string(),
            }],
            chapters: vec![Chapter {
                id: 12,
                title: "The Ferry".to_string(),
            }],
            ..Default::default()
        })
    }

    fn input() -> (ReferenceInput, Receiver<AppEvent>) {
        let (tx, rx) = std::sync::mpsc::channel();
        let input = ReferenceInput::new(field(), catalog(), AppEventSender::new(tx));
        (input, rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut ReferenceInput, text: &str) {
        for c in text.chars() {
            input.handle_key_event(key(KeyCode::Char(c)));
        }
    }

    fn changes(rx: &Receiver<AppEvent>) -> Vec<String> {
        rx.try_iter()
            .filter_map(|ev| match ev {
                AppEvent::ValueChanged(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (buf.area.x..buf.area.right())
            .map(|x| buf[(x, y)].symbol())
            .collect()
    }

    #[test]
    fn each_keystroke_notifies_once() {
        let (mut input, rx) = input();
        type_str(&mut input, "hi");
        input.handle_key_event(key(KeyCode::Left));
        assert_eq!(changes(&rx), vec!["h".to_string(), "hi".to_string()]);
    }

    #[test]
    fn trigger_opens_menu_and_choosing_removes_it() {
        let (mut input, rx) = input();
        type_str(&mut input, "a@");
        assert!(input.is_menu_open());
        input.handle_key_event(key(KeyCode::Down));
        input.handle_key_event(key(KeyCode::Down));
        input.handle_key_event(key(KeyCode::Down));
        let (result, _) = input.handle_key_event(key(KeyCode::Enter));
        assert_eq!(result, InputResult::OpenPicker(RefKind::Chapter));
        assert!(!input.is_menu_open());
        assert_eq!(input.value(), "a");
        assert_eq!(
            changes(&rx),
            vec!["a".to_string(), "a@".to_string(), "a".to_string()]
        );
    }

    #[test]
    fn altgr_trigger_opens_menu() {
        let (mut input, _rx) = input();
        input.handle_key_event(KeyEvent::new(
            KeyCode::Char('@'),
            KeyModifiers::CONTROL | KeyModifiers::ALT,
        ));
        assert_eq!(input.value(), "@");
        assert!(input.is_menu_open());
    }

    #[test]
    fn esc_closes_menu_and_keeps_trigger() {
        let (mut input, _rx) = input();
        type_str(&mut input, "@");
        let (result, _) = input.handle_key_event(key(KeyCode::Esc));
        assert_eq!(result, InputResult::None);
        assert!(!input.is_menu_open());
        assert_eq!(input.value(), "@");
    }

    #[test]
    fn typing_on_closes_menu_and_inserts() {
        let (mut input, _rx) = input();
        type_str(&mut input, "me@x");
        assert!(!input.is_menu_open());
        assert_eq!(input.value(), "me@x");
    }

    #[test]
    fn pasting_or_replacing_with_trigger_only_opens_for_single_char() {
        let (mut input, _rx) = input();
        input.handle_paste("mail@example".to_string());
        assert!(!input.is_menu_open());
        input.handle_paste("@".to_string());
        assert!(input.is_menu_open());
    }

    #[test]
    fn paste_normalizes_line_endings() {
        let (mut input, rx) = input();
        input.handle_paste("a\r\nb\rc".to_string());
        assert_eq!(input.value(), "a\nb\nc");
        assert_eq!(changes(&rx).len(), 1);
    }

    #[test]
    fn multi_insert_notifies_once() {
        let (mut input, rx) = input();
        type_str(&mut input, "x ");
        let _ = changes(&rx);
        assert!(input.insert_reference(RefKind::Character, &[7, 8], None));
        assert_eq!(
            changes(&rx),
            vec!["x {{@::Character::7}} {{@::Character::8}}".to_string()]
        );
        assert!(!input.insert_reference(RefKind::Character, &[], None));
        assert!(changes(&rx).is_empty());
    }

    #[test]
    fn enter_submits_and_ctrl_j_inserts_newline() {
        let (mut input, _rx) = input();
        type_str(&mut input, "a");
        input.handle_key_event(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::CONTROL));
        type_str(&mut input, "b");
        let (result, _) = input.handle_key_event(key(KeyCode::Enter));
        assert_eq!(result, InputResult::Submitted("a\nb".to_string()));
    }

    #[test]
    fn set_value_is_silent() {
        let (mut input, rx) = input();
        input.set_value("{{@::Character::7}}");
        assert!(changes(&rx).is_empty());
        assert_eq!(input.referenced_ids(RefKind::Character), HashSet::from([7]));
        assert!(input.referenced_ids(RefKind::Memo).is_empty());
    }

    #[test]
    fn renders_label_placeholder_and_chips() {
        let (mut input, _rx) = input();
        let area = Rect::new(0, 0, 60, input.desired_height(60));
        assert_eq!(area.height, 3);

        let mut buf = Buffer::empty(area);
        (&input).render_ref(area, &mut buf);
        assert!(row_text(&buf, 0).contains("Scene brief *"));
        assert!(row_text(&buf, 1).contains("Describe the scene"));

        input.set_value("See {{@::Character::7}} now");
        let mut buf = Buffer::empty(area);
        (&input).render_ref(area, &mut buf);
        assert!(row_text(&buf, 1).contains("See  Ada  now"));
        assert_eq!(input.cursor_pos(area), Some((1 + 13, 1)));
    }

    #[test]
    fn menu_sits_below_caret_or_flips_above() {
        let (mut input, _rx) = input();
        type_str(&mut input, "ab@");
        let input_area = Rect::new(0, 0, 60, 3);

        let roomy = Rect::new(0, 0, 60, 20);
        assert_eq!(
            input.menu_area(input_area, roomy),
            Some(Rect::new(3, 2, CATEGORY_MENU_WIDTH, 6))
        );

        let input_area = Rect::new(0, 14, 60, 3);
        let cramped = Rect::new(0, 0, 60, 17);
        assert_eq!(
            input.menu_area(input_area, cramped),
            Some(Rect::new(3, 9, CATEGORY_MENU_WIDTH, 6))
        );
    }
}
