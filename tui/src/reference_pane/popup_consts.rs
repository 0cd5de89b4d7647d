//! Shared popup-related constants for the reference pane.

/// Maximum number of rows any popup should attempt to display.
pub(crate) const MAX_POPUP_ROWS: usize = 8;

/// Width of the category menu drawn next to the caret.
pub(crate) const CATEGORY_MENU_WIDTH: u16 = 34;
