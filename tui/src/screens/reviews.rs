//! Reviews: bookings waiting for a review, and the reviews the current user
//! has received

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use fumotion_core::validation::ValidationError;
use fumotion_core::{ApiGateway, Booking, ClientError, RecordId, Result, UserReviews};

use super::{framed, notify_or_error, Action};
use crate::theme;
use crate::widgets::{Field, Form, FormEvent, SelectList};

const RATING: usize = 0;
const COMMENT: usize = 1;

fn pending_line(booking: &Booking) -> Line<'static> {
    match &booking.trip {
        Some(trip) => Line::from(format!(
            "{}  {}  (booking #{})",
            trip.departure_display(),
            trip.route(),
            booking.id
        )),
        None => Line::from(format!("Booking #{} on trip #{}", booking.id, booking.trip_id)),
    }
}

fn stars(rating: i64) -> String {
    let filled = rating.clamp(0, 5) as usize;
    format!("{}{}", "*".repeat(filled), ".".repeat(5 - filled))
}

pub struct ReviewsView {
    user_id: Option<RecordId>,
    pending: SelectList<Booking>,
    received: UserReviews,
    /// Rating form for the selected booking
    prompt: Option<Form>,
}

impl ReviewsView {
    pub fn new(user_id: Option<RecordId>) -> Self {
        Self {
            user_id,
            pending: SelectList::default(),
            received: UserReviews::default(),
            prompt: None,
        }
    }

    pub fn prompting(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn hints(&self) -> &'static str {
        if self.prompt.is_some() {
            "Enter submit review | Tab next field | Esc cancel"
        } else {
            "Enter review booking | r refresh | Esc back"
        }
    }

    pub async fn refresh(&mut self, gateway: &ApiGateway) -> Result<()> {
        let pending = gateway.reviews().pending().await?;
        self.pending.set_items(pending);
        if let Some(user_id) = self.user_id {
            self.received = gateway.reviews().for_user(user_id).await?;
        }
        Ok(())
    }

    fn received_lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![match self.received.average {
            Some(average) => Line::styled(
                format!(
                    "Average {average:.1} / 5 over {} review(s)",
                    self.received.reviews.len()
                ),
                theme::title(),
            ),
            None => Line::styled("No reviews received yet", theme::dim()),
        }];
        lines.extend(self.received.reviews.iter().map(|review| {
            let comment = review.comment.as_deref().unwrap_or("");
            Line::styled(
                format!("{}  {comment}", stars(review.rating)),
                Style::default(),
            )
        }));
        lines
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let prompt_height = if self.prompt.is_some() { 4 } else { 0 };
        let [pending_area, prompt_area, received_area] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(prompt_height),
            Constraint::Fill(1),
        ])
        .areas(area);

        self.pending.render(
            frame,
            pending_area,
            "Waiting for your review",
            "Nothing to review",
            pending_line,
        );

        if let Some(prompt) = &self.prompt {
            let inner = framed(frame, prompt_area, "Your review");
            prompt.render(frame, inner);
        }

        let inner = framed(frame, received_area, "Reviews about you");
        frame.render_widget(Paragraph::new(self.received_lines()), inner);
    }

    async fn submit(&mut self, gateway: &ApiGateway, booking_id: RecordId) -> Action {
        let Some(prompt) = &self.prompt else {
            return Action::Consumed;
        };
        let input = prompt.value(RATING).trim().to_string();
        let rating = match input.parse::<i64>() {
            Ok(rating) => rating,
            Err(_) => {
                return Action::Error(ClientError::from(ValidationError::InvalidNumber {
                    field: "rating",
                    value: input,
                }))
            }
        };
        let comment = prompt.value(COMMENT).to_string();
        if let Err(e) = gateway
            .reviews()
            .create(booking_id, rating, Some(&comment))
            .await
        {
            return Action::Error(e);
        }
        self.prompt = None;
        notify_or_error(self.refresh(gateway).await, "Thanks for your review")
    }

    pub async fn handle_key(&mut self, key: KeyEvent, gateway: &ApiGateway) -> Option<Action> {
        if let Some(prompt) = self.prompt.as_mut() {
            return match prompt.handle_key(key) {
                FormEvent::Submit => {
                    let booking_id = self.pending.selected()?.id;
                    Some(self.submit(gateway, booking_id).await)
                }
                FormEvent::Handled => Some(Action::Consumed),
                FormEvent::Ignored if key.code == KeyCode::Esc => {
                    self.prompt = None;
                    Some(Action::Consumed)
                }
                FormEvent::Ignored => None,
            };
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.pending.previous(),
            KeyCode::Down | KeyCode::Char('j') => self.pending.next(),
            KeyCode::Enter if !self.pending.is_empty() => {
                self.prompt = Some(Form::new(vec![
                    Field::new("Rating").placeholder("1 to 5"),
                    Field::new("Comment").placeholder("optional"),
                ]));
            }
            KeyCode::Char('r') => {
                return Some(notify_or_error(self.refresh(gateway).await, "Refreshed"))
            }
            _ => return None,
        }
        Some(Action::Consumed)
    }
}
