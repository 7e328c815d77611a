//! Screen Views
//!
//! One view per navigation screen. A view owns the data it shows, loads it
//! through the typed API on entry, renders itself, and turns key presses
//! into [`Action`]s that the [`crate::App`] applies.
//!
//! Views never navigate by themselves: every screen change is an `Action`
//! that ends in `FumotionClient::navigate`, so the navigation guards apply
//! to all of them.

mod admin;
mod auth;
mod bookings;
mod home;
mod messages;
mod profile;
mod reviews;
mod trips;

pub use admin::{AdminBookingsView, AdminTripsView, AdminUsersView, AdminView};
pub use auth::{LoginView, RegisterView};
pub use bookings::{BookingsView, ReceivedBookingsView};
pub use home::HomeView;
pub use messages::{ChatView, ConversationsView};
pub use profile::ProfileView;
pub use reviews::ReviewsView;
pub use trips::{CreateTripView, MyTripsView, SearchView, TripDetailView};

use crossterm::event::KeyEvent;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use tokio::sync::mpsc;

use fumotion_core::{ClientError, FumotionClient, NavParams, PollUpdate, Screen};

use crate::theme;

/// What a key press asks the app to do
#[derive(Debug)]
pub enum Action {
    /// Key used by the view, nothing else to do
    Consumed,
    Navigate(Screen, NavParams),
    Back,
    Logout,
    Quit,
    /// Show a confirmation in the status line
    Notify(String),
    /// Show an error (and leave protected screens after a 401)
    Error(ClientError),
}

impl From<ClientError> for Action {
    fn from(error: ClientError) -> Self {
        Self::Error(error)
    }
}

/// Turn the outcome of a mutation into an action
pub(crate) fn notify_or_error<T>(result: fumotion_core::Result<T>, message: &str) -> Action {
    match result {
        Ok(_) => Action::Notify(message.to_string()),
        Err(e) => Action::Error(e),
    }
}

/// Draw a titled border and return the area inside it
pub(crate) fn framed(frame: &mut Frame, area: Rect, title: &str) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border())
        .title(Line::styled(format!(" {title} "), theme::title()));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// A `width` x `height` box centered in `area` (borders included)
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [_, row, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height + 2),
        Constraint::Fill(1),
    ])
    .areas(area);
    let [_, cell, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width),
        Constraint::Fill(1),
    ])
    .areas(row);
    cell
}

/// The live view for the current screen
pub enum View {
    Loading,
    Login(LoginView),
    Register(RegisterView),
    Home(HomeView),
    Search(SearchView),
    TripDetail(TripDetailView),
    CreateTrip(CreateTripView),
    MyTrips(MyTripsView),
    Bookings(BookingsView),
    ReceivedBookings(ReceivedBookingsView),
    Conversations(ConversationsView),
    Chat(ChatView),
    Reviews(ReviewsView),
    Profile(ProfileView),
    Admin(AdminView),
    AdminUsers(AdminUsersView),
    AdminTrips(AdminTripsView),
    AdminBookings(AdminBookingsView),
}

impl View {
    /// Build and load the view for the client's current screen.
    ///
    /// A failed initial load still yields the (empty) view; the error is
    /// returned alongside it.
    pub async fn enter(
        client: &FumotionClient,
        poll_tx: &mpsc::Sender<PollUpdate>,
    ) -> (Self, Option<ClientError>) {
        let gateway = client.gateway();
        let nav = client.state();

        macro_rules! loaded {
            ($variant:ident, $view:expr) => {{
                let mut view = $view;
                let error = view.refresh(gateway).await.err();
                (View::$variant(view), error)
            }};
        }

        match nav.screen {
            Screen::Loading => (View::Loading, None),
            Screen::Login => (View::Login(LoginView::new()), None),
            Screen::Register => (View::Register(RegisterView::new()), None),
            Screen::Home => (View::Home(HomeView::new(client.session().is_admin())), None),
            Screen::Search => (View::Search(SearchView::new()), None),
            Screen::TripDetail => match nav.selected_trip_id {
                Some(trip_id) => loaded!(TripDetail, TripDetailView::new(trip_id)),
                None => (View::Loading, None),
            },
            Screen::CreateTrip => (View::CreateTrip(CreateTripView::new()), None),
            Screen::MyTrips => loaded!(MyTrips, MyTripsView::default()),
            Screen::Bookings => loaded!(Bookings, BookingsView::default()),
            Screen::ReceivedBookings => loaded!(ReceivedBookings, ReceivedBookingsView::default()),
            Screen::Conversations => loaded!(Conversations, ConversationsView::default()),
            Screen::Chat => match client.open_chat(poll_tx.clone()).await {
                Some(chat) => {
                    let me = client.current_user().map(|u| u.id);
                    (View::Chat(ChatView::new(chat, me)), None)
                }
                None => (View::Loading, None),
            },
            Screen::Reviews => {
                let user_id = client.current_user().map(|u| u.id);
                loaded!(Reviews, ReviewsView::new(user_id))
            }
            Screen::Profile => (View::Profile(ProfileView::new(client.current_user())), None),
            Screen::Admin => loaded!(Admin, AdminView::default()),
            Screen::AdminUsers => loaded!(AdminUsers, AdminUsersView::default()),
            Screen::AdminTrips => loaded!(AdminTrips, AdminTripsView::default()),
            Screen::AdminBookings => loaded!(AdminBookings, AdminBookingsView::default()),
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        match self {
            View::Loading => {
                frame.render_widget(Paragraph::new("Loading...").style(theme::dim()), area)
            }
            View::Login(v) => v.render(frame, area),
            View::Register(v) => v.render(frame, area),
            View::Home(v) => v.render(frame, area),
            View::Search(v) => v.render(frame, area),
            View::TripDetail(v) => v.render(frame, area),
            View::CreateTrip(v) => v.render(frame, area),
            View::MyTrips(v) => v.render(frame, area),
            View::Bookings(v) => v.render(frame, area),
            View::ReceivedBookings(v) => v.render(frame, area),
            View::Conversations(v) => v.render(frame, area),
            View::Chat(v) => v.render(frame, area),
            View::Reviews(v) => v.render(frame, area),
            View::Profile(v) => v.render(frame, area),
            View::Admin(v) => v.render(frame, area),
            View::AdminUsers(v) => v.render(frame, area),
            View::AdminTrips(v) => v.render(frame, area),
            View::AdminBookings(v) => v.render(frame, area),
        }
    }

    /// Offer a key to the view. `None` means the view did not use it.
    pub async fn handle_key(&mut self, key: KeyEvent, client: &FumotionClient) -> Option<Action> {
        let gateway = client.gateway();
        match self {
            View::Loading => None,
            View::Login(v) => v.handle_key(key, gateway).await,
            View::Register(v) => v.handle_key(key, gateway).await,
            View::Home(v) => v.handle_key(key),
            View::Search(v) => v.handle_key(key, gateway).await,
            View::TripDetail(v) => v.handle_key(key, client).await,
            View::CreateTrip(v) => v.handle_key(key, gateway).await,
            View::MyTrips(v) => v.handle_key(key, gateway).await,
            View::Bookings(v) => v.handle_key(key, gateway).await,
            View::ReceivedBookings(v) => v.handle_key(key, gateway).await,
            View::Conversations(v) => v.handle_key(key, gateway).await,
            View::Chat(v) => v.handle_key(key).await,
            View::Reviews(v) => v.handle_key(key, gateway).await,
            View::Profile(v) => v.handle_key(key, gateway).await,
            View::Admin(v) => v.handle_key(key, gateway).await,
            View::AdminUsers(v) => v.handle_key(key, gateway).await,
            View::AdminTrips(v) => v.handle_key(key, gateway).await,
            View::AdminBookings(v) => v.handle_key(key, gateway).await,
        }
    }

    /// Route a poll result to the chat view; other views drop it
    pub fn apply_poll(&mut self, update: PollUpdate) {
        if let View::Chat(chat) = self {
            chat.apply_poll(update);
        }
    }

    /// Whether plain letters are typed into a text field
    pub fn captures_text(&self) -> bool {
        match self {
            View::Login(_)
            | View::Register(_)
            | View::CreateTrip(_)
            | View::Chat(_)
            | View::Profile(_) => true,
            View::Search(v) => v.editing(),
            View::TripDetail(v) => v.prompting(),
            View::Reviews(v) => v.prompting(),
            _ => false,
        }
    }

    /// Key hints for the footer
    pub fn hints(&self) -> &'static str {
        match self {
            View::Loading => "",
            View::Login(_) => "Enter sign in | Tab next field | F2 create account | Esc quit",
            View::Register(_) => "Enter create account | Tab next field | Esc back",
            View::Home(_) => "Up/Down select | Enter open | q quit",
            View::Search(v) => v.hints(),
            View::TripDetail(v) => v.hints(),
            View::CreateTrip(_) => "Enter publish | Tab next field | Esc back",
            View::MyTrips(_) => "Enter details | c complete | x cancel | r refresh | Esc back",
            View::Bookings(_) => "Enter trip | x cancel booking | r refresh | Esc back",
            View::ReceivedBookings(_) => {
                "a accept | d decline | m message | r refresh | Esc back"
            }
            View::Conversations(_) => "Enter open chat | r refresh | Esc back",
            View::Chat(_) => "Enter send | PgUp/PgDn scroll | Esc back",
            View::Reviews(v) => v.hints(),
            View::Profile(_) => "Enter save | Tab next field | Esc back",
            View::Admin(_) => "Enter open | r refresh | Esc back",
            View::AdminUsers(_) => "a toggle admin | d delete | r refresh | Esc back",
            View::AdminTrips(_) | View::AdminBookings(_) => "d delete | r refresh | Esc back",
        }
    }
}
