//! Conversation list and the live chat screen

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use fumotion_core::{
    ApiGateway, ChatSession, Conversation, Message, NavParams, PollUpdate, RecordId, Result,
    Screen, VISIBLE_MESSAGES,
};

use super::{framed, notify_or_error, Action};
use crate::theme;
use crate::widgets::{Field, Form, FormEvent, SelectList, TextBlock, TextBlockState};

// =============================================================================
// Conversations
// =============================================================================

fn conversation_line(conversation: &Conversation) -> Line<'static> {
    let name = format!("{} {}", conversation.first_name, conversation.last_name);
    let mut spans = vec![
        Span::styled(format!("{name:<24}"), theme::title()),
        Span::raw(conversation.last_message.clone()),
    ];
    if conversation.unread_count > 0 {
        spans.push(Span::styled(
            format!("  ({} new)", conversation.unread_count),
            Style::default().fg(theme::WARNING_AMBER),
        ));
    }
    Line::from(spans)
}

#[derive(Default)]
pub struct ConversationsView {
    conversations: SelectList<Conversation>,
}

impl ConversationsView {
    pub async fn refresh(&mut self, gateway: &ApiGateway) -> Result<()> {
        let conversations = gateway.messages().conversations().await?;
        self.conversations.set_items(conversations);
        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.conversations.render(
            frame,
            area,
            "Messages",
            "No conversations yet",
            conversation_line,
        );
    }

    pub async fn handle_key(&mut self, key: KeyEvent, gateway: &ApiGateway) -> Option<Action> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.conversations.previous(),
            KeyCode::Down | KeyCode::Char('j') => self.conversations.next(),
            KeyCode::Enter => {
                let user_id = self.conversations.selected()?.user_id;
                return Some(Action::Navigate(Screen::Chat, NavParams::user(user_id)));
            }
            KeyCode::Char('r') => {
                return Some(notify_or_error(self.refresh(gateway).await, "Refreshed"))
            }
            _ => return None,
        }
        Some(Action::Consumed)
    }
}

// =============================================================================
// Chat
// =============================================================================

pub struct ChatView {
    chat: ChatSession,
    me: Option<RecordId>,
    input: Form,
    transcript: TextBlockState,
}

impl ChatView {
    pub fn new(chat: ChatSession, me: Option<RecordId>) -> Self {
        Self {
            chat,
            me,
            input: Form::new(vec![Field::new("Message")]),
            transcript: TextBlockState::tailing(),
        }
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn apply_poll(&mut self, update: PollUpdate) {
        self.chat.apply(update);
    }

    fn transcript_lines(&self) -> Vec<(String, Style)> {
        let them = self.chat.counterpart_name();
        self.chat
            .recent(VISIBLE_MESSAGES)
            .iter()
            .map(|message: &Message| {
                let mine = Some(message.sender_id) == self.me;
                let (who, color) = if mine {
                    ("You", theme::OWN_MESSAGE)
                } else {
                    (them.as_str(), theme::OTHER_MESSAGE)
                };
                let stamp = message.created_at.replacen('T', " ", 1);
                let stamp = stamp.get(..16).unwrap_or(&stamp);
                (
                    format!("[{stamp}] {who}: {}", message.message),
                    Style::default().fg(color),
                )
            })
            .collect()
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [transcript_area, status_area, input_area] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .areas(area);

        let title = format!("Chat with {}", self.chat.counterpart_name());
        let inner = framed(frame, transcript_area, &title);
        let lines = self.transcript_lines();
        if lines.is_empty() {
            frame.render_widget(
                Paragraph::new("No messages yet. Say hello!").style(theme::dim()),
                inner,
            );
        } else {
            frame.render_stateful_widget(TextBlock::new(&lines), inner, &mut self.transcript);
        }

        if let Some(error) = self.chat.error() {
            frame.render_widget(
                Paragraph::new(error.to_string()).style(Style::default().fg(theme::ERROR_RED)),
                status_area,
            );
        }

        let inner = framed(frame, input_area, "Write");
        self.input.render(frame, inner);
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::PageUp => {
                self.transcript.scroll(-1);
                return Some(Action::Consumed);
            }
            KeyCode::PageDown => {
                self.transcript.scroll(1);
                return Some(Action::Consumed);
            }
            _ => {}
        }

        match self.input.handle_key(key) {
            FormEvent::Submit => {
                let text = self.input.value(0).to_string();
                match self.chat.send(&text).await {
                    Ok(()) => {
                        self.input.set_value(0, "");
                        self.transcript.follow_tail = true;
                        Some(Action::Consumed)
                    }
                    Err(e) => Some(Action::Error(e)),
                }
            }
            FormEvent::Handled => Some(Action::Consumed),
            FormEvent::Ignored => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_line_marks_unread() {
        let conversation = Conversation {
            user_id: 3,
            first_name: "Ana".into(),
            last_name: "Lopez".into(),
            avatar: None,
            last_message: "See you at 8".into(),
            last_message_time: "2026-05-01T07:00:00".into(),
            unread_count: 2,
        };
        let text: String = conversation_line(&conversation)
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(text.starts_with("Ana Lopez"));
        assert!(text.contains("See you at 8"));
        assert!(text.contains("(2 new)"));
    }
}
