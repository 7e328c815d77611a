//! Trip screens: search, details, publishing, and the driver's own trips

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::Frame;

use fumotion_core::validation::{parse_seat_count, TripForm};
use fumotion_core::{
    ApiGateway, ClientError, FumotionClient, NavParams, RecordId, Result, Screen, Trip, TripSearch,
    TripStatus,
};

use super::{framed, notify_or_error, Action};
use crate::theme;
use crate::widgets::{Field, Form, FormEvent, SelectList, TextBlock, TextBlockState};

/// One-line trip summary for lists
pub(crate) fn trip_line(trip: &Trip) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}  ", trip.departure_display()), theme::dim()),
        Span::raw(format!("{:<32}", trip.route())),
        Span::raw(format!(
            "{:>2} seat(s)  {:>7.2} EUR  ",
            trip.available_seats, trip.price_per_seat
        )),
        Span::styled(format!("[{}]", trip.status), theme::trip_status(trip.status)),
    ])
}

// =============================================================================
// Search
// =============================================================================

const DEPARTURE: usize = 0;
const ARRIVAL: usize = 1;
const DATE: usize = 2;

pub struct SearchView {
    form: Form,
    results: SelectList<Trip>,
    total: i64,
    page: u32,
    editing: bool,
    searched: bool,
}

impl SearchView {
    pub fn new() -> Self {
        Self {
            form: Form::new(vec![
                Field::new("From"),
                Field::new("To"),
                Field::new("Date").placeholder("YYYY-MM-DD, optional"),
            ]),
            results: SelectList::default(),
            total: 0,
            page: 1,
            editing: true,
            searched: false,
        }
    }

    pub fn editing(&self) -> bool {
        self.editing
    }

    pub fn hints(&self) -> &'static str {
        if self.editing {
            "Enter search | Tab next field | Esc back"
        } else {
            "Enter details | / edit search | n/p page | Esc back"
        }
    }

    fn filters(&self) -> TripSearch {
        let optional = |index: usize| {
            let value = self.form.value(index).trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        TripSearch {
            departure: optional(DEPARTURE),
            arrival: optional(ARRIVAL),
            date: optional(DATE),
            page: Some(self.page),
        }
    }

    async fn search(&mut self, gateway: &ApiGateway) -> Result<()> {
        let page = gateway.trips().search(&self.filters()).await?;
        self.total = page.total;
        self.results = SelectList::new(page.trips);
        self.searched = true;
        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [form_area, results_area] =
            Layout::vertical([Constraint::Length(5), Constraint::Fill(1)]).areas(area);

        let inner = framed(frame, form_area, "Search trips");
        if self.editing {
            self.form.render(frame, inner);
        } else {
            let summary = format!(
                "From: {}  To: {}  Date: {}",
                self.form.value(DEPARTURE),
                self.form.value(ARRIVAL),
                self.form.value(DATE)
            );
            frame.render_widget(ratatui::widgets::Paragraph::new(summary), inner);
        }

        let title = format!("{} trip(s), page {}", self.total, self.page);
        let empty = if self.searched {
            "No trips match these filters"
        } else {
            "Fill in the filters and press Enter"
        };
        self.results.render(frame, results_area, &title, empty, trip_line);
    }

    pub async fn handle_key(&mut self, key: KeyEvent, gateway: &ApiGateway) -> Option<Action> {
        if self.editing {
            return match self.form.handle_key(key) {
                FormEvent::Submit => {
                    self.page = 1;
                    Some(match self.search(gateway).await {
                        Ok(()) => {
                            self.editing = self.results.is_empty();
                            Action::Consumed
                        }
                        Err(e) => Action::Error(e),
                    })
                }
                FormEvent::Handled => Some(Action::Consumed),
                FormEvent::Ignored => None,
            };
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.results.previous(),
            KeyCode::Down | KeyCode::Char('j') => self.results.next(),
            KeyCode::Char('/') | KeyCode::Char('s') => self.editing = true,
            KeyCode::Enter => {
                return self
                    .results
                    .selected()
                    .map(|trip| Action::Navigate(Screen::TripDetail, NavParams::trip(trip.id)));
            }
            KeyCode::Char('n') if !self.results.is_empty() => {
                self.page += 1;
                if let Err(e) = self.search(gateway).await {
                    return Some(Action::Error(e));
                }
            }
            KeyCode::Char('p') if self.page > 1 => {
                self.page -= 1;
                if let Err(e) = self.search(gateway).await {
                    return Some(Action::Error(e));
                }
            }
            _ => return None,
        }
        Some(Action::Consumed)
    }
}

impl Default for SearchView {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Trip detail
// =============================================================================

pub struct TripDetailView {
    trip_id: RecordId,
    trip: Option<Trip>,
    /// Seat prompt while booking
    prompt: Option<Form>,
    text: TextBlockState,
}

impl TripDetailView {
    pub fn new(trip_id: RecordId) -> Self {
        Self {
            trip_id,
            trip: None,
            prompt: None,
            text: TextBlockState::default(),
        }
    }

    pub fn trip(&self) -> Option<&Trip> {
        self.trip.as_ref()
    }

    pub fn prompting(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn hints(&self) -> &'static str {
        if self.prompt.is_some() {
            "Enter confirm booking | Esc cancel"
        } else {
            "b book | m message driver | c complete | x cancel trip | r refresh | Esc back"
        }
    }

    pub async fn refresh(&mut self, gateway: &ApiGateway) -> Result<()> {
        self.trip = Some(gateway.trips().get(self.trip_id).await?);
        Ok(())
    }

    fn lines(trip: &Trip) -> Vec<(String, Style)> {
        let plain = Style::default();
        let mut lines = vec![
            (trip.route(), theme::title()),
            (String::new(), plain),
            (format!("Departure   {}", trip.departure_display()), plain),
            (
                format!("From        {}, {}", trip.departure_address, trip.departure_city),
                plain,
            ),
            (
                format!("To          {}, {}", trip.arrival_address, trip.arrival_city),
                plain,
            ),
            (format!("Seats left  {}", trip.available_seats), plain),
            (format!("Price       {:.2} EUR per seat", trip.price_per_seat), plain),
            (format!("Status      {}", trip.status), theme::trip_status(trip.status)),
        ];
        if let Some(driver) = &trip.driver_name {
            lines.push((format!("Driver      {driver}"), plain));
        }
        lines
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [detail_area, prompt_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]).areas(area);

        let inner = framed(frame, detail_area, "Trip details");
        let lines = self.trip.as_ref().map(Self::lines).unwrap_or_default();
        frame.render_stateful_widget(TextBlock::new(&lines), inner, &mut self.text);

        if let Some(prompt) = &self.prompt {
            let inner = framed(frame, prompt_area, "Book seats");
            prompt.render(frame, inner);
        }
    }

    async fn book(&mut self, gateway: &ApiGateway, trip: &Trip, input: &str) -> Action {
        let seats = match parse_seat_count(input) {
            Ok(seats) => seats,
            Err(e) => return Action::Error(ClientError::from(e)),
        };
        if let Err(e) = gateway.bookings().book(trip, seats).await {
            return Action::Error(e);
        }
        self.prompt = None;
        notify_or_error(
            self.refresh(gateway).await,
            &format!("Booking request sent for {seats} seat(s)"),
        )
    }

    pub async fn handle_key(&mut self, key: KeyEvent, client: &FumotionClient) -> Option<Action> {
        let gateway = client.gateway();

        if let Some(prompt) = self.prompt.as_mut() {
            return match prompt.handle_key(key) {
                FormEvent::Submit => {
                    let input = prompt.value(0).to_string();
                    let trip = self.trip.clone()?;
                    Some(self.book(gateway, &trip, &input).await)
                }
                FormEvent::Handled => Some(Action::Consumed),
                FormEvent::Ignored if key.code == KeyCode::Esc => {
                    self.prompt = None;
                    Some(Action::Consumed)
                }
                FormEvent::Ignored => None,
            };
        }

        let trip = self.trip.clone()?;
        let is_driver = client
            .current_user()
            .is_some_and(|user| trip.is_driver(&user));

        match key.code {
            KeyCode::Char('b') if !is_driver && trip.status == TripStatus::Active => {
                self.prompt = Some(Form::new(vec![Field::new("Seats").with_value("1")]));
                Some(Action::Consumed)
            }
            KeyCode::Char('m') if !is_driver => Some(Action::Navigate(
                Screen::Chat,
                NavParams::user(trip.driver_id).with_trip(trip.id),
            )),
            KeyCode::Char('c') if is_driver => {
                if let Err(e) = gateway.trips().complete(trip.id).await {
                    return Some(Action::Error(e));
                }
                Some(notify_or_error(self.refresh(gateway).await, "Trip completed"))
            }
            KeyCode::Char('x') if is_driver => {
                if let Err(e) = gateway.trips().cancel(trip.id).await {
                    return Some(Action::Error(e));
                }
                Some(notify_or_error(self.refresh(gateway).await, "Trip cancelled"))
            }
            KeyCode::Char('r') => Some(notify_or_error(self.refresh(gateway).await, "Refreshed")),
            KeyCode::Up | KeyCode::PageUp => {
                self.text.scroll(-1);
                Some(Action::Consumed)
            }
            KeyCode::Down | KeyCode::PageDown => {
                self.text.scroll(1);
                Some(Action::Consumed)
            }
            _ => None,
        }
    }
}

// =============================================================================
// Create trip
// =============================================================================

pub struct CreateTripView {
    form: Form,
}

impl CreateTripView {
    pub fn new() -> Self {
        Self {
            form: Form::new(vec![
                Field::new("Departure city"),
                Field::new("Departure address").placeholder("defaults to the city"),
                Field::new("Arrival city"),
                Field::new("Arrival address").placeholder("defaults to the city"),
                Field::new("Date").placeholder("YYYY-MM-DD"),
                Field::new("Time").placeholder("HH:MM"),
                Field::new("Seats").placeholder("3"),
                Field::new("Price per seat").placeholder("5"),
            ]),
        }
    }

    fn trip_form(&self) -> TripForm {
        TripForm {
            departure_city: self.form.value(0).to_string(),
            departure_address: self.form.value(1).to_string(),
            arrival_city: self.form.value(2).to_string(),
            arrival_address: self.form.value(3).to_string(),
            date: self.form.value(4).to_string(),
            time: self.form.value(5).to_string(),
            seats: self.form.value(6).to_string(),
            price: self.form.value(7).to_string(),
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner = framed(frame, area, "Offer a trip");
        self.form.render(frame, inner);
    }

    pub async fn handle_key(&mut self, key: KeyEvent, gateway: &ApiGateway) -> Option<Action> {
        match self.form.handle_key(key) {
            FormEvent::Submit => {
                let new_trip = match self.trip_form().validate() {
                    Ok(new_trip) => new_trip,
                    Err(e) => return Some(Action::Error(e.into())),
                };
                Some(match gateway.trips().create(&new_trip).await {
                    Ok(trip) => Action::Navigate(Screen::TripDetail, NavParams::trip(trip.id)),
                    Err(e) => Action::Error(e),
                })
            }
            FormEvent::Handled => Some(Action::Consumed),
            FormEvent::Ignored => None,
        }
    }
}

impl Default for CreateTripView {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// My trips
// =============================================================================

#[derive(Default)]
pub struct MyTripsView {
    trips: SelectList<Trip>,
}

impl MyTripsView {
    pub async fn refresh(&mut self, gateway: &ApiGateway) -> Result<()> {
        let trips = gateway.trips().mine().await?;
        self.trips.set_items(trips);
        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.trips.render(
            frame,
            area,
            "My trips",
            "You have not published any trip yet",
            trip_line,
        );
    }

    pub async fn handle_key(&mut self, key: KeyEvent, gateway: &ApiGateway) -> Option<Action> {
        let selected = self.trips.selected().map(|trip| trip.id);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.trips.previous(),
            KeyCode::Down | KeyCode::Char('j') => self.trips.next(),
            KeyCode::Enter => {
                return selected.map(|id| Action::Navigate(Screen::TripDetail, NavParams::trip(id)))
            }
            KeyCode::Char('c') => {
                let id = selected?;
                if let Err(e) = gateway.trips().complete(id).await {
                    return Some(Action::Error(e));
                }
                return Some(notify_or_error(self.refresh(gateway).await, "Trip completed"));
            }
            KeyCode::Char('x') => {
                let id = selected?;
                if let Err(e) = gateway.trips().cancel(id).await {
                    return Some(Action::Error(e));
                }
                return Some(notify_or_error(self.refresh(gateway).await, "Trip cancelled"));
            }
            KeyCode::Char('r') => {
                return Some(notify_or_error(self.refresh(gateway).await, "Refreshed"))
            }
            _ => return None,
        }
        Some(Action::Consumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fumotion_core::test_utils::sample_trip;

    #[test]
    fn test_trip_line_mentions_route_and_status() {
        let line = trip_line(&sample_trip(1, 2));
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains("Paris -> Lyon"));
        assert!(text.contains("[active]"));
        assert!(text.contains("12.50 EUR"));
    }

    #[test]
    fn test_search_filters_skip_blank_fields() {
        let mut view = SearchView::new();
        view.form.set_value(DEPARTURE, " Paris ");
        let filters = view.filters();
        assert_eq!(filters.departure.as_deref(), Some("Paris"));
        assert_eq!(filters.arrival, None);
        assert_eq!(filters.page, Some(1));
    }
}
