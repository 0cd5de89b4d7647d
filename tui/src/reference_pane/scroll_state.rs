/// Selection and scroll position shared by the list popups.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScrollState {
    pub selected_idx: Option<usize>,
    pub scroll_top: usize,
}

impl ScrollState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Keep the selection inside `0..len`, selecting the first row when the
    /// list becomes non-empty.
    pub(crate) fn clamp_selection(&mut self, len: usize) {
        self.selected_idx = match len {
            0 => None,
            _ => Some(self.selected_idx.unwrap_or(0).min(len - 1)),
        };
        if len == 0 {
            self.scroll_top = 0;
        }
    }

    pub(crate) fn move_up_wrap(&mut self, len: usize) {
        if len == 0 {
            self.selected_idx = None;
            return;
        }
        self.selected_idx = Some(match self.selected_idx {
            Some(0) | None => len - 1,
            Some(idx) => idx - 1,
        });
    }

    pub(crate) fn move_down_wrap(&mut self, len: usize) {
        if len == 0 {
            self.selected_idx = None;
            return;
        }
        self.selected_idx = Some(match self.selected_idx {
            Some(idx) if idx + 1 < len => idx + 1,
            _ => 0,
        });
    }

    /// Adjust `scroll_top` so the selected row sits inside a window of
    /// `visible_rows` rows.
    pub(crate) fn ensure_visible(&mut self, len: usize, visible_rows: usize) {
        if len == 0 || visible_rows == 0 {
            self.scroll_top = 0;
            return;
        }
        let Some(sel) = self.selected_idx else {
            self.scroll_top = 0;
            return;
        };
        if sel < self.scroll_top {
            self.scroll_top = sel;
        } else if sel >= self.scroll_top + visible_rows {
            self.scroll_top = sel + 1 - visible_rows;
        }
        self.scroll_top = self.scroll_top.min(len.saturating_sub(visible_rows));
    }
}
