//! TextBlock Widget
//!
//! A borderless, scrollable region of styled, word-wrapped lines. Used for
//! the chat transcript and the trip detail page.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::StatefulWidget;
use textwrap::wrap;

/// State for a scrollable text block
#[derive(Debug, Default)]
pub struct TextBlockState {
    /// Scroll offset (lines from top)
    pub scroll_offset: usize,
    /// Total wrapped lines at last render
    pub total_lines: usize,
    /// Keep the newest line visible (chat transcripts)
    pub follow_tail: bool,
}

impl TextBlockState {
    pub fn tailing() -> Self {
        Self {
            follow_tail: true,
            ..Self::default()
        }
    }

    /// Scroll by delta (positive = down). Scrolling up stops tailing.
    pub fn scroll(&mut self, delta: i32) {
        let new_offset = self.scroll_offset as i32 + delta;
        self.scroll_offset = new_offset.max(0) as usize;
        if delta < 0 {
            self.follow_tail = false;
        }
    }
}

/// A borderless, scrollable text block
pub struct TextBlock<'a> {
    lines: &'a [(String, Style)],
}

impl<'a> TextBlock<'a> {
    pub fn new(lines: &'a [(String, Style)]) -> Self {
        Self { lines }
    }
}

/// Wrap styled lines to `width` columns
pub fn wrap_lines(lines: &[(String, Style)], width: usize) -> Vec<(String, Style)> {
    let width = width.max(1);
    lines
        .iter()
        .flat_map(|(line, style)| {
            if line.is_empty() {
                vec![(String::new(), *style)]
            } else {
                wrap(line, width)
                    .into_iter()
                    .map(|cow| (cow.to_string(), *style))
                    .collect()
            }
        })
        .collect()
}

impl<'a> StatefulWidget for TextBlock<'a> {
    type State = TextBlockState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let wrapped = wrap_lines(self.lines, area.width as usize);
        state.total_lines = wrapped.len();

        let max_scroll = state.total_lines.saturating_sub(area.height as usize);
        if state.follow_tail || state.scroll_offset >= max_scroll {
            state.scroll_offset = max_scroll;
            state.follow_tail = true;
        }

        for (i, (line, style)) in wrapped
            .iter()
            .skip(state.scroll_offset)
            .take(area.height as usize)
            .enumerate()
        {
            let y = area.y + i as u16;
            buf.set_stringn(area.x, y, line, area.width as usize, *style);
        }
    }
}
