//! Navigation State Machine
//!
//! Screens are named states; [`NavigationController::transition`] is the only
//! way to move between them.
//!
//! # Sticky Parameters
//!
//! A transition may carry a selected trip id and/or a selected user id.
//! Supplied values overwrite the stored ones; omitted values keep whatever
//! was selected before. Returning to `trip-detail` from `chat` therefore
//! shows the same trip without the caller passing it again.
//!
//! The trip a chat is about is the exception: it is only set when the
//! transition into `chat` supplies a trip id itself, and every other
//! transition clears it.
//!
//! # Guards
//!
//! The effective screen can differ from the requested one:
//! - protected screens without a session resolve to `login`
//! - admin screens for a non-admin user resolve to `home`
//! - `trip-detail` with no selected trip, or `chat` with no selected user,
//!   resolve to `home`

use std::fmt;

use crate::models::RecordId;
use crate::session::SessionStore;

/// Every screen the client can show
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Screen {
    /// Initial pseudo-state until the startup probe completes
    #[default]
    Loading,
    Login,
    Register,
    Home,
    Search,
    TripDetail,
    CreateTrip,
    MyTrips,
    Bookings,
    ReceivedBookings,
    Conversations,
    Chat,
    Reviews,
    Profile,
    Admin,
    AdminUsers,
    AdminTrips,
    AdminBookings,
}

impl Screen {
    pub const ALL: [Screen; 18] = [
        Screen::Loading,
        Screen::Login,
        Screen::Register,
        Screen::Home,
        Screen::Search,
        Screen::TripDetail,
        Screen::CreateTrip,
        Screen::MyTrips,
        Screen::Bookings,
        Screen::ReceivedBookings,
        Screen::Conversations,
        Screen::Chat,
        Screen::Reviews,
        Screen::Profile,
        Screen::Admin,
        Screen::AdminUsers,
        Screen::AdminTrips,
        Screen::AdminBookings,
    ];

    /// Stable kebab-case identifier
    pub fn id(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Login => "login",
            Self::Register => "register",
            Self::Home => "home",
            Self::Search => "search",
            Self::TripDetail => "trip-detail",
            Self::CreateTrip => "create-trip",
            Self::MyTrips => "my-trips",
            Self::Bookings => "bookings",
            Self::ReceivedBookings => "received-bookings",
            Self::Conversations => "conversations",
            Self::Chat => "chat",
            Self::Reviews => "reviews",
            Self::Profile => "profile",
            Self::Admin => "admin",
            Self::AdminUsers => "admin-users",
            Self::AdminTrips => "admin-trips",
            Self::AdminBookings => "admin-bookings",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|screen| screen.id() == id)
    }

    /// Human-readable title
    pub fn title(&self) -> &'static str {
        match self {
            Self::Loading => "Loading",
            Self::Login => "Sign in",
            Self::Register => "Create account",
            Self::Home => "Home",
            Self::Search => "Search trips",
            Self::TripDetail => "Trip details",
            Self::CreateTrip => "Offer a trip",
            Self::MyTrips => "My trips",
            Self::Bookings => "My bookings",
            Self::ReceivedBookings => "Booking requests",
            Self::Conversations => "Messages",
            Self::Chat => "Chat",
            Self::Reviews => "Reviews",
            Self::Profile => "Profile",
            Self::Admin => "Administration",
            Self::AdminUsers => "Users",
            Self::AdminTrips => "All trips",
            Self::AdminBookings => "All bookings",
        }
    }

    /// Screens reachable only with a session
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Loading | Self::Login | Self::Register)
    }

    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Self::Admin | Self::AdminUsers | Self::AdminTrips | Self::AdminBookings
        )
    }

    /// Where "back" leads; `None` for roots
    pub fn back_target(&self) -> Option<Self> {
        match self {
            Self::Loading | Self::Login | Self::Home => None,
            Self::Register => Some(Self::Login),
            Self::TripDetail => Some(Self::Search),
            Self::Chat => Some(Self::Conversations),
            Self::AdminUsers | Self::AdminTrips | Self::AdminBookings => Some(Self::Admin),
            Self::Search
            | Self::CreateTrip
            | Self::MyTrips
            | Self::Bookings
            | Self::ReceivedBookings
            | Self::Conversations
            | Self::Reviews
            | Self::Profile
            | Self::Admin => Some(Self::Home),
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Parameters supplied with a transition
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavParams {
    pub trip_id: Option<RecordId>,
    pub user_id: Option<RecordId>,
}

impl NavParams {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn trip(trip_id: RecordId) -> Self {
        Self {
            trip_id: Some(trip_id),
            user_id: None,
        }
    }

    pub fn user(user_id: RecordId) -> Self {
        Self {
            trip_id: None,
            user_id: Some(user_id),
        }
    }

    pub fn with_trip(mut self, trip_id: RecordId) -> Self {
        self.trip_id = Some(trip_id);
        self
    }
}

/// Current screen plus sticky selections
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub screen: Screen,
    pub selected_trip_id: Option<RecordId>,
    pub selected_user_id: Option<RecordId>,
    /// Trip attached to the open chat; never carried over
    pub chat_trip_id: Option<RecordId>,
}

impl NavigationState {
    /// Sticky merge: supplied params overwrite, omitted params persist
    fn merge(&mut self, params: NavParams) {
        if let Some(trip_id) = params.trip_id {
            self.selected_trip_id = Some(trip_id);
        }
        if let Some(user_id) = params.user_id {
            self.selected_user_id = Some(user_id);
        }
    }
}

/// Owns the navigation state for the life of the process
#[derive(Debug, Default)]
pub struct NavigationController {
    state: NavigationState,
    offline: bool,
}

impl NavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn screen(&self) -> Screen {
        self.state.screen
    }

    pub fn selected_trip_id(&self) -> Option<RecordId> {
        self.state.selected_trip_id
    }

    pub fn selected_user_id(&self) -> Option<RecordId> {
        self.state.selected_user_id
    }

    /// Trip context of the current chat, if the transition into it named one
    pub fn chat_trip_id(&self) -> Option<RecordId> {
        self.state.chat_trip_id
    }

    /// Set when the startup probe found the service unreachable
    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// Screen actually shown when `target` is requested with the current selections
    fn resolve(&self, target: Screen, session: &SessionStore) -> Screen {
        if target.requires_auth() && !session.is_authenticated() {
            return Screen::Login;
        }
        if target.requires_admin() && !session.is_admin() {
            return Screen::Home;
        }
        match target {
            Screen::TripDetail if self.state.selected_trip_id.is_none() => Screen::Home,
            Screen::Chat if self.state.selected_user_id.is_none() => Screen::Home,
            other => other,
        }
    }

    /// Move to `target`, merging `params`, and return the effective screen
    pub fn transition(
        &mut self,
        target: Screen,
        params: NavParams,
        session: &SessionStore,
    ) -> Screen {
        let from = self.state.screen;
        self.state.merge(params);
        let screen = self.resolve(target, session);
        self.state.screen = screen;
        self.state.chat_trip_id = match screen {
            Screen::Chat => params.trip_id,
            _ => None,
        };

        tracing::debug!(
            from = %from,
            requested = %target,
            to = %screen,
            trip_id = ?self.state.selected_trip_id,
            user_id = ?self.state.selected_user_id,
            "Navigation transition"
        );

        screen
    }

    /// Go to the current screen's back target (no-op on root screens)
    pub fn back(&mut self, session: &SessionStore) -> Screen {
        match self.state.screen.back_target() {
            Some(target) => self.transition(target, NavParams::none(), session),
            None => self.state.screen,
        }
    }

    /// Pick the first real screen once reachability is known
    pub fn start(&mut self, reachable: bool, session: &SessionStore) -> Screen {
        self.offline = !reachable;
        let target = if reachable && session.is_authenticated() {
            Screen::Home
        } else {
            Screen::Login
        };
        tracing::info!(
            reachable,
            authenticated = session.is_authenticated(),
            screen = %target,
            "Client started"
        );
        self.transition(target, NavParams::none(), session)
    }

    /// Clear the session and selections, then return to `login`
    pub fn logout(&mut self, session: &SessionStore) -> Screen {
        session.clear();
        self.state = NavigationState {
            screen: self.state.screen,
            ..NavigationState::default()
        };
        self.transition(Screen::Login, NavParams::none(), session)
    }
}
