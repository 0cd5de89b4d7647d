use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::sync::mpsc::channel;
use std::thread;

use color_eyre::eyre::Result;
use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use quill_core::EntityCatalog;
use quill_core::config::Config;

use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::reference_pane::CancellationEvent;
use crate::reference_pane::FieldConfig;
use crate::reference_pane::InputResult;
use crate::reference_pane::ReferencePane;
use crate::reference_pane::ReferencePaneParams;
use crate::tui;

pub(crate) struct App {
    app_event_tx: AppEventSender,
    app_event_rx: Receiver<AppEvent>,
    pane: ReferencePane,
}

impl App {
    pub(crate) fn new(
        config: &Config,
        catalog: EntityCatalog,
        initial_value: Option<String>,
    ) -> Self {
        let (app_event_tx, app_event_rx) = channel();
        let app_event_tx = AppEventSender::new(app_event_tx);

        // Spawn a dedicated thread for reading the crossterm event loop and
        // re-publishing the events as AppEvents, as appropriate.
        {
            let app_event_tx = app_event_tx.clone();
            thread::spawn(move || {
                loop {
                    let event = match crossterm::event::read() {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::error!("failed to read terminal event: {e}");
                            app_event_tx.send(AppEvent::ExitRequest);
                            break;
                        }
                    };
                    let app_event = match event {
                        Event::Key(key_event) => AppEvent::KeyEvent(key_event),
                        Event::Resize(_, _) => AppEvent::Redraw,
                        Event::Paste(pasted) => AppEvent::Paste(pasted),
                        _ => continue,
                    };
                    app_event_tx.send(app_event);
                }
            });
        }

        let pane = ReferencePane::new(ReferencePaneParams {
            app_event_tx: app_event_tx.clone(),
            catalog: Arc::new(catalog),
            field: FieldConfig::from(config),
            initial_value,
        });

        Self {
            app_event_tx,
            app_event_rx,
            pane,
        }
    }

    /// Run until the value is submitted (`Some`) or the user quits (`None`).
    pub(crate) fn run(&mut self, terminal: &mut tui::Tui) -> Result<Option<String>> {
        // Insert an event to trigger the first render.
        self.app_event_tx.send(AppEvent::Redraw);

        while let Ok(event) = self.app_event_rx.recv() {
            match event {
                AppEvent::Redraw => self.draw_next_frame(terminal)?,
                AppEvent::KeyEvent(key_event) => match key_event {
                    KeyEvent {
                        code: KeyCode::Char('c'),
                        modifiers: KeyModifiers::CONTROL,
                        kind: KeyEventKind::Press,
                        ..
                    } => {
                        if self.pane.on_ctrl_c() == CancellationEvent::NotHandled {
                            self.app_event_tx.send(AppEvent::ExitRequest);
                        }
                    }
                    KeyEvent {
                        code: KeyCode::Char('d'),
                        modifiers: KeyModifiers::CONTROL,
                        kind: KeyEventKind::Press,
                        ..
                    } => {
                        self.app_event_tx.send(AppEvent::ExitRequest);
                    }
                    KeyEvent {
                        kind: KeyEventKind::Press | KeyEventKind::Repeat,
                        ..
                    } => {
                        if let InputResult::Submitted(value) = self.pane.handle_key_event(key_event)
                        {
                            tracing::info!("value submitted ({} bytes)", value.len());
                            return Ok(Some(value));
                        }
                    }
                    _ => {
                        // Ignore key release events.
                    }
                },
                AppEvent::Paste(text) => self.pane.handle_paste(text),
                AppEvent::ValueChanged(value) => {
                    tracing::debug!(value = %value, "value changed");
                }
                AppEvent::ExitRequest => {
                    tracing::info!(
                        "exiting without submitting; discarding {} bytes",
                        self.pane.value().len()
                    );
                    break;
                }
            }
        }
        Ok(None)
    }

    fn draw_next_frame(&mut self, terminal: &mut tui::Tui) -> Result<()> {
        terminal.draw(|frame| {
            let area = frame.area();
            frame.render_widget_ref(&self.pane, area);
            if let Some((x, y)) = self.pane.cursor_pos(area) {
                frame.set_cursor_position((x, y));
            }
        })?;
        Ok(())
    }
}
