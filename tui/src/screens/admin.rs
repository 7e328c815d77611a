//! Admin dashboard and the user / trip / booking management tables
//!
//! Deletions are armed by the first `d` and carried out by a second `d` on
//! the same row.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use fumotion_core::{
    ApiGateway, Booking, NavParams, ProfileUpdate, RecordId, Result, Screen, Statistics, Trip,
    User,
};

use super::trips::trip_line;
use super::{framed, notify_or_error, Action};
use crate::theme;
use crate::widgets::SelectList;

/// Two-step delete on a list row
#[derive(Debug, Default)]
struct ConfirmDelete {
    armed: Option<RecordId>,
}

impl ConfirmDelete {
    /// True when `id` was already armed; otherwise arm it
    fn confirm(&mut self, id: RecordId) -> bool {
        if self.armed == Some(id) {
            self.armed = None;
            true
        } else {
            self.armed = Some(id);
            false
        }
    }

    fn reset(&mut self) {
        self.armed = None;
    }
}

const ARMED_MESSAGE: &str = "Press d again to delete";

// =============================================================================
// Dashboard
// =============================================================================

pub struct AdminView {
    stats: Statistics,
    menu: SelectList<Screen>,
}

impl Default for AdminView {
    fn default() -> Self {
        Self {
            stats: Statistics::default(),
            menu: SelectList::new(vec![
                Screen::AdminUsers,
                Screen::AdminTrips,
                Screen::AdminBookings,
            ]),
        }
    }
}

impl AdminView {
    pub async fn refresh(&mut self, gateway: &ApiGateway) -> Result<()> {
        self.stats = gateway.admin().statistics().await?;
        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [stats_area, menu_area] =
            Layout::vertical([Constraint::Length(6), Constraint::Fill(1)]).areas(area);

        let inner = framed(frame, stats_area, "Statistics");
        let row = |label: &'static str, value: i64| {
            Line::from(vec![
                Span::styled(format!("{label:<16}"), theme::dim()),
                Span::raw(value.to_string()),
            ])
        };
        frame.render_widget(
            Paragraph::new(vec![
                row("Users", self.stats.total_users),
                row("Trips", self.stats.total_trips),
                row("Active trips", self.stats.active_trips),
                row("Bookings", self.stats.total_bookings),
            ]),
            inner,
        );

        self.menu
            .render(frame, menu_area, "Manage", "", |screen| Line::from(screen.title()));
    }

    pub async fn handle_key(&mut self, key: KeyEvent, gateway: &ApiGateway) -> Option<Action> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.menu.previous(),
            KeyCode::Down | KeyCode::Char('j') => self.menu.next(),
            KeyCode::Enter => {
                let screen = *self.menu.selected()?;
                return Some(Action::Navigate(screen, NavParams::none()));
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
// Users
// =============================================================================

fn user_line(user: &User) -> Line<'static> {
    let mut spans = vec![
        Span::raw(format!("#{:<5}", user.id)),
        Span::raw(format!("{:<28}", user.full_name())),
        Span::styled(user.email.clone(), theme::dim()),
    ];
    if user.is_admin {
        spans.push(Span::styled("  [admin]", theme::title()));
    }
    Line::from(spans)
}

#[derive(Default)]
pub struct AdminUsersView {
    users: SelectList<User>,
    delete: ConfirmDelete,
}

impl AdminUsersView {
    pub async fn refresh(&mut self, gateway: &ApiGateway) -> Result<()> {
        let users = gateway.admin().users().await?;
        self.users.set_items(users);
        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.users
            .render(frame, area, "Users", "No users", user_line);
    }

    pub async fn handle_key(&mut self, key: KeyEvent, gateway: &ApiGateway) -> Option<Action> {
        if key.code != KeyCode::Char('d') {
            self.delete.reset();
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.users.previous(),
            KeyCode::Down | KeyCode::Char('j') => self.users.next(),
            KeyCode::Char('a') => {
                let user = self.users.selected()?;
                let (id, make_admin) = (user.id, !user.is_admin);
                let update = ProfileUpdate {
                    is_admin: Some(make_admin),
                    ..Default::default()
                };
                if let Err(e) = gateway.admin().update_user(id, &update).await {
                    return Some(Action::Error(e));
                }
                let message = if make_admin {
                    "User promoted to admin"
                } else {
                    "Admin rights removed"
                };
                return Some(notify_or_error(self.refresh(gateway).await, message));
            }
            KeyCode::Char('d') => {
                let id = self.users.selected()?.id;
                if !self.delete.confirm(id) {
                    return Some(Action::Notify(ARMED_MESSAGE.to_string()));
                }
                if let Err(e) = gateway.admin().delete_user(id).await {
                    return Some(Action::Error(e));
                }
                return Some(notify_or_error(self.refresh(gateway).await, "User deleted"));
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
// Trips
// =============================================================================

#[derive(Default)]
pub struct AdminTripsView {
    trips: SelectList<Trip>,
    delete: ConfirmDelete,
}

impl AdminTripsView {
    pub async fn refresh(&mut self, gateway: &ApiGateway) -> Result<()> {
        let trips = gateway.admin().trips().await?;
        self.trips.set_items(trips);
        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.trips
            .render(frame, area, "All trips", "No trips", trip_line);
    }

    pub async fn handle_key(&mut self, key: KeyEvent, gateway: &ApiGateway) -> Option<Action> {
        if key.code != KeyCode::Char('d') {
            self.delete.reset();
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.trips.previous(),
            KeyCode::Down | KeyCode::Char('j') => self.trips.next(),
            KeyCode::Char('d') => {
                let id = self.trips.selected()?.id;
                if !self.delete.confirm(id) {
                    return Some(Action::Notify(ARMED_MESSAGE.to_string()));
                }
                if let Err(e) = gateway.admin().delete_trip(id).await {
                    return Some(Action::Error(e));
                }
                return Some(notify_or_error(self.refresh(gateway).await, "Trip deleted"));
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
// Bookings
// =============================================================================

fn admin_booking_line(booking: &Booking) -> Line<'static> {
    let passenger = booking
        .passenger
        .as_ref()
        .map(User::full_name)
        .unwrap_or_else(|| format!("User #{}", booking.passenger_id));
    Line::from(vec![
        Span::raw(format!("#{:<5}", booking.id)),
        Span::raw(format!("trip #{:<6}", booking.trip_id)),
        Span::raw(format!("{passenger:<28}")),
        Span::raw(format!("{} seat(s)  ", booking.seats_booked)),
        Span::styled(
            format!("[{}]", booking.status),
            theme::booking_status(booking.status),
        ),
    ])
}

#[derive(Default)]
pub struct AdminBookingsView {
    bookings: SelectList<Booking>,
    delete: ConfirmDelete,
}

impl AdminBookingsView {
    pub async fn refresh(&mut self, gateway: &ApiGateway) -> Result<()> {
        let bookings = gateway.admin().bookings().await?;
        self.bookings.set_items(bookings);
        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.bookings
            .render(frame, area, "All bookings", "No bookings", admin_booking_line);
    }

    pub async fn handle_key(&mut self, key: KeyEvent, gateway: &ApiGateway) -> Option<Action> {
        if key.code != KeyCode::Char('d') {
            self.delete.reset();
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.bookings.previous(),
            KeyCode::Down | KeyCode::Char('j') => self.bookings.next(),
            KeyCode::Char('d') => {
                let id = self.bookings.selected()?.id;
                if !self.delete.confirm(id) {
                    return Some(Action::Notify(ARMED_MESSAGE.to_string()));
                }
                if let Err(e) = gateway.admin().delete_booking(id).await {
                    return Some(Action::Error(e));
                }
                return Some(notify_or_error(
                    self.refresh(gateway).await,
                    "Booking deleted",
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
