//! Booking screens: the passenger's reservations and the requests a driver
//! receives on their trips

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::Frame;

use fumotion_core::{ApiGateway, Booking, BookingDecision, NavParams, Result, Screen};

use super::{notify_or_error, Action};
use crate::theme;
use crate::widgets::SelectList;

fn booking_line(booking: &Booking) -> Line<'static> {
    let route = booking
        .trip
        .as_ref()
        .map(|trip| format!("{}  {}", trip.departure_display(), trip.route()))
        .unwrap_or_else(|| format!("Trip #{}", booking.trip_id));
    let mut spans = vec![Span::raw(format!("{route:<48}"))];
    if let Some(passenger) = &booking.passenger {
        spans.push(Span::styled(format!("{}  ", passenger.full_name()), theme::dim()));
    }
    spans.push(Span::raw(format!("{} seat(s)  ", booking.seats_booked)));
    spans.push(Span::styled(
        format!("[{}]", booking.status),
        theme::booking_status(booking.status),
    ));
    Line::from(spans)
}

#[derive(Default)]
pub struct BookingsView {
    bookings: SelectList<Booking>,
}

impl BookingsView {
    pub async fn refresh(&mut self, gateway: &ApiGateway) -> Result<()> {
        let bookings = gateway.bookings().mine().await?;
        self.bookings.set_items(bookings);
        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.bookings.render(
            frame,
            area,
            "My bookings",
            "No bookings yet. Find a trip from the home menu.",
            booking_line,
        );
    }

    pub async fn handle_key(&mut self, key: KeyEvent, gateway: &ApiGateway) -> Option<Action> {
        let selected = self.bookings.selected().cloned();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.bookings.previous(),
            KeyCode::Down | KeyCode::Char('j') => self.bookings.next(),
            KeyCode::Enter => {
                return selected
                    .map(|b| Action::Navigate(Screen::TripDetail, NavParams::trip(b.trip_id)))
            }
            KeyCode::Char('x') => {
                let booking = selected?;
                if !booking.is_cancellable() {
                    return Some(Action::Notify(format!(
                        "A {} booking cannot be cancelled",
                        booking.status
                    )));
                }
                if let Err(e) = gateway.bookings().cancel(booking.id).await {
                    return Some(Action::Error(e));
                }
                return Some(notify_or_error(
                    self.refresh(gateway).await,
                    "Booking cancelled",
                ));
            }
            KeyCode::Char('r') => {
                return Some(notify_or_error(self.refresh(gateway).await, "Refreshed"))
            }
            _ => return None,
        }
        Some(Action::Consumed)
    }
}

#[derive(Default)]
pub struct ReceivedBookingsView {
    bookings: SelectList<Booking>,
}

impl ReceivedBookingsView {
    pub async fn refresh(&mut self, gateway: &ApiGateway) -> Result<()> {
        let bookings = gateway.bookings().for_my_trips().await?;
        self.bookings.set_items(bookings);
        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.bookings.render(
            frame,
            area,
            "Requests on my trips",
            "Nobody has booked your trips yet",
            booking_line,
        );
    }

    async fn decide(&mut self, gateway: &ApiGateway, decision: BookingDecision) -> Option<Action> {
        let id = self.bookings.selected()?.id;
        if let Err(e) = gateway.bookings().set_status(id, decision).await {
            return Some(Action::Error(e));
        }
        let message = match decision {
            BookingDecision::Confirmed => "Booking accepted",
            BookingDecision::Rejected => "Booking declined",
        };
        Some(notify_or_error(self.refresh(gateway).await, message))
    }

    pub async fn handle_key(&mut self, key: KeyEvent, gateway: &ApiGateway) -> Option<Action> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.bookings.previous(),
            KeyCode::Down | KeyCode::Char('j') => self.bookings.next(),
            KeyCode::Char('a') => return self.decide(gateway, BookingDecision::Confirmed).await,
            KeyCode::Char('d') => return self.decide(gateway, BookingDecision::Rejected).await,
            KeyCode::Char('m') => {
                let booking = self.bookings.selected()?;
                return Some(Action::Navigate(
                    Screen::Chat,
                    NavParams::user(booking.passenger_id).with_trip(booking.trip_id),
                ));
            }
            KeyCode::Enter => {
                let booking = self.bookings.selected()?;
                return Some(Action::Navigate(
                    Screen::TripDetail,
                    NavParams::trip(booking.trip_id),
                ));
            }
            KeyCode::Char('r') => {
                return Some(notify_or_error(self.refresh(gateway).await, "Refreshed"))
            }
            _ => return None,
        }
        Some(Action::Consumed)
    }
}
