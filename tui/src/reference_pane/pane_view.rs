use crossterm::event::KeyEvent;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use super::CancellationEvent;
use super::ReferencePane;

/// Trait implemented by every modal view shown under the reference input.
pub(crate) trait PaneView {
    /// Handle a key event while the view is active. A redraw is always
    /// scheduled after this call.
    fn handle_key_event(&mut self, _pane: &mut ReferencePane, _key_event: KeyEvent) {}

    /// Pasted text while the view is active. Return `true` if consumed.
    fn handle_paste(&mut self, _pasted: String) -> bool {
        false
    }

    /// Return `true` if the view has finished and should be removed.
    fn is_complete(&self) -> bool {
        false
    }

    /// Handle Ctrl-C while this view is active.
    fn on_ctrl_c(&mut self, _pane: &mut ReferencePane) -> CancellationEvent {
        CancellationEvent::NotHandled
    }

    /// Rows this view wants when drawn `width` columns wide.
    fn desired_height(&self, width: u16) -> u16;

    fn render(&self, area: Rect, buf: &mut Buffer);

    /// Where the terminal cursor goes while this view is active.
    fn cursor_pos(&self, _area: Rect) -> Option<(u16, u16)> {
        None
    }
}
