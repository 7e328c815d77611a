//! SelectList Widget
//!
//! A bordered list with a movable selection, backed by ratatui's `List`.

use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use ratatui::Frame;

use crate::theme;

#[derive(Debug)]
pub struct SelectList<T> {
    items: Vec<T>,
    state: ListState,
}

impl<T> Default for SelectList<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> SelectList<T> {
    pub fn new(items: Vec<T>) -> Self {
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }
        Self { items, state }
    }

    /// Replace the items, keeping the selection index when it is still valid
    pub fn set_items(&mut self, items: Vec<T>) {
        let selected = self.state.selected().unwrap_or(0);
        self.items = items;
        if self.items.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(selected.min(self.items.len() - 1)));
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selected(&self) -> Option<&T> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = self.state.selected().map_or(0, |i| (i + 1) % self.items.len());
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let len = self.items.len();
        let i = self.state.selected().map_or(0, |i| (i + len - 1) % len);
        self.state.select(Some(i));
    }

    /// Render with `describe` producing each row
    pub fn render<F>(&mut self, frame: &mut Frame, area: Rect, title: &str, empty: &str, describe: F)
    where
        F: Fn(&T) -> Line<'static>,
    {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme::border())
            .title(Line::styled(format!(" {title} "), theme::title()));

        if self.items.is_empty() {
            let placeholder = List::new(vec![ListItem::new(Line::styled(
                empty.to_string(),
                theme::dim(),
            ))])
            .block(block);
            frame.render_widget(placeholder, area);
            return;
        }

        let rows: Vec<ListItem> = self
            .items
            .iter()
            .map(|item| ListItem::new(describe(item)))
            .collect();
        let list = List::new(rows)
            .block(block)
            .highlight_style(theme::highlight())
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, area, &mut self.state);
    }
}
