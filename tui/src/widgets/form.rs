//! Form Widget
//!
//! A vertical stack of labelled single-line text inputs with one focused
//! field. Enter submits, Tab / arrows move focus.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::theme;

/// One input field
#[derive(Clone, Debug)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
    /// Render as `*` (passwords)
    pub masked: bool,
    /// Shown dimmed while the field is empty
    pub placeholder: &'static str,
}

impl Field {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            masked: false,
            placeholder: "",
        }
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    fn display_value(&self) -> String {
        if self.masked {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

/// Result of feeding a key to the form
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormEvent {
    /// Key consumed (edit or focus move)
    Handled,
    /// Enter pressed
    Submit,
    /// Key not meant for the form
    Ignored,
}

#[derive(Clone, Debug)]
pub struct Form {
    fields: Vec<Field>,
    focus: usize,
}

impl Form {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields, focus: 0 }
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields
            .get(index)
            .map(|f| f.value.as_str())
            .unwrap_or_default()
    }

    pub fn set_value(&mut self, index: usize, value: impl Into<String>) {
        if let Some(field) = self.fields.get_mut(index) {
            field.value = value.into();
        }
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn move_focus(&mut self, delta: isize) {
        if self.fields.is_empty() {
            return;
        }
        let len = self.fields.len() as isize;
        self.focus = ((self.focus as isize + delta).rem_euclid(len)) as usize;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormEvent {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return FormEvent::Ignored;
        }
        match key.code {
            KeyCode::Enter => FormEvent::Submit,
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(1);
                FormEvent::Handled
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(-1);
                FormEvent::Handled
            }
            KeyCode::Backspace => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    field.value.pop();
                }
                FormEvent::Handled
            }
            KeyCode::Char(c) => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    field.value.push(c);
                }
                FormEvent::Handled
            }
            _ => FormEvent::Ignored,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let label_width = self
            .fields
            .iter()
            .map(|f| f.label.width())
            .max()
            .unwrap_or(0);

        let lines: Vec<Line> = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let focused = i == self.focus;
                let marker = if focused { "> " } else { "  " };
                let label = format!("{marker}{:<label_width$} : ", field.label);
                let label_style = if focused { theme::title() } else { theme::dim() };
                let value = if field.value.is_empty() {
                    Span::styled(field.placeholder, theme::dim())
                } else {
                    Span::styled(field.display_value(), Style::default())
                };
                Line::from(vec![Span::styled(label, label_style), value])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), area);

        if let Some(field) = self.fields.get(self.focus) {
            let x = area.x + (2 + label_width + 3 + field.display_value().width()) as u16;
            let y = area.y + self.focus as u16;
            if x < area.right() && y < area.bottom() {
                frame.set_cursor_position((x, y));
            }
        }
    }
}
