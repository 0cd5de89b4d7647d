use crossterm::event::KeyEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AppEvent {
    /// Draw the next frame.
    Redraw,

    KeyEvent(KeyEvent),

    /// Text pasted from the terminal clipboard.
    Paste(String),

    /// The field value changed. Carries the full encoded buffer and is sent
    /// exactly once per committed edit.
    ValueChanged(String),

    /// Leave the app without submitting.
    ExitRequest,
}
