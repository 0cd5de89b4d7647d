//! Reference pane: shows the ReferenceInput and, while one is active, a
//! PaneView (the entity picker) underneath it.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use pane_view::PaneView;
use quill_core::ChapterVariant;
use quill_core::EntityCatalog;
use quill_core::RefKind;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::WidgetRef;

use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;

mod category_popup;
mod entity_picker;
mod pane_view;
mod popup_consts;
mod reference_input;
mod scroll_state;
mod selection_popup_common;
mod textarea;

pub(crate) use reference_input::FieldConfig;
pub(crate) use reference_input::InputResult;

use entity_picker::EntityPickerView;
use reference_input::ReferenceInput;

/// How a Ctrl-C press was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CancellationEvent {
    Handled,
    NotHandled,
}

pub(crate) struct ReferencePane {
    /// Kept while a view is displayed so the text and caret survive it.
    input: ReferenceInput,

    /// If present, drawn under the input and receives all keys.
    active_view: Option<Box<dyn PaneView>>,

    app_event_tx: AppEventSender,
    catalog: Arc<EntityCatalog>,
}

pub(crate) struct ReferencePaneParams {
    pub(crate) app_event_tx: AppEventSender,
    pub(crate) catalog: Arc<EntityCatalog>,
    pub(crate) field: FieldConfig,
    pub(crate) initial_value: Option<String>,
}

impl ReferencePane {
    pub fn new(params: ReferencePaneParams) -> Self {
        let ReferencePaneParams {
            app_event_tx,
            catalog,
            field,
            initial_value,
        } = params;
        let mut input = ReferenceInput::new(field, catalog.clone(), app_event_tx.clone());
        if let Some(value) = initial_value {
            input.set_value(&value);
        }
        Self {
            input,
            active_view: None,
            app_event_tx,
            catalog,
        }
    }

    pub(crate) fn value(&self) -> &str {
        self.input.value()
    }

    /// Forward a key event to the active view or the input.
    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> InputResult {
        if let Some(mut view) = self.active_view.take() {
            view.handle_key_event(self, key_event);
            if !view.is_complete() {
                self.active_view = Some(view);
            }
            self.request_redraw();
            InputResult::None
        } else {
            let (input_result, needs_redraw) = self.input.handle_key_event(key_event);
            let input_result = match input_result {
                InputResult::OpenPicker(kind) => {
                    self.open_picker(kind);
                    InputResult::None
                }
                other => other,
            };
            if needs_redraw {
                self.request_redraw();
            }
            input_result
        }
    }

    pub fn handle_paste(&mut self, pasted: String) {
        let needs_redraw = match self.active_view.as_mut() {
            Some(view) => view.handle_paste(pasted),
            None => self.input.handle_paste(pasted),
        };
        if needs_redraw {
            self.request_redraw();
        }
    }

    /// Ctrl-C closes whatever popup is open. Returns `NotHandled` when there
    /// was nothing to close, in which case the app quits.
    pub(crate) fn on_ctrl_c(&mut self) -> CancellationEvent {
        if let Some(mut view) = self.active_view.take() {
            let event = view.on_ctrl_c(self);
            if !view.is_complete() {
                self.active_view = Some(view);
            }
            self.request_redraw();
            return event;
        }
        if self.input.is_menu_open() {
            self.input.dismiss_menu();
            self.request_redraw();
            return CancellationEvent::Handled;
        }
        CancellationEvent::NotHandled
    }

    /// Insert references chosen in a picker as a single edit.
    pub(crate) fn insert_reference(
        &mut self,
        kind: RefKind,
        ids: &[u64],
        variant: Option<ChapterVariant>,
    ) {
        if self.input.insert_reference(kind, ids, variant) {
            self.request_redraw();
        }
    }

    fn open_picker(&mut self, kind: RefKind) {
        let entries = self.catalog.entries(kind);
        tracing::debug!("opening {kind} picker with {} entries", entries.len());
        let referenced = self.input.referenced_ids(kind);
        self.active_view = Some(Box::new(EntityPickerView::new(kind, entries, referenced)));
    }

    pub(crate) fn request_redraw(&self) {
        self.app_event_tx.send(AppEvent::Redraw)
    }

    /// Split `area` into the input rows and the view rows below them.
    fn layout(&self, area: Rect) -> (Rect, Rect) {
        let input_height = self.input.desired_height(area.width).min(area.height);
        let input_area = Rect {
            height: input_height,
            ..area
        };
        let remaining = area.height - input_height;
        let view_height = self
            .active_view
            .as_ref()
            .map(|view| view.desired_height(area.width).min(remaining))
            .unwrap_or(0);
        let view_area = Rect {
            y: area.y + input_height,
            height: view_height,
            ..area
        };
        (input_area, view_area)
    }

    /// Terminal cursor position: inside the active view when it has one,
    /// otherwise at the input caret.
    pub fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        let (input_area, view_area) = self.layout(area);
        match &self.active_view {
            Some(view) => view.cursor_pos(view_area),
            None => self.input.cursor_pos(input_area),
        }
    }
}

impl WidgetRef for &ReferencePane {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let (input_area, view_area) = self.layout(area);
        (&self.input).render_ref(input_area, buf);
        match &self.active_view {
            Some(view) => view.render(view_area, buf),
            None => self.input.render_menu(input_area, area, buf),
        }
    }
}
