//! Fumotion Core - Client runtime for the Fumotion carpooling service
//!
//! This crate holds everything a terminal surface needs apart from drawing:
//!
//! - **Session**: the persisted token + user pair ([`session`])
//! - **Gateway**: the only component that talks to the network ([`gateway`])
//! - **API**: typed calls per resource with local validation ([`api`])
//! - **Navigation**: the screen state machine with sticky params ([`navigation`])
//! - **Polling**: the cancellable conversation refresh task ([`polling`], [`chat`])
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐      ┌────────────────────────────────────────────┐
//! │   Surface    │─────▶│ FumotionClient                             │
//! │ (ratatui UI) │      │  NavigationController   SessionStore       │
//! └──────────────┘      │         │                    ▲             │
//!        ▲              │         ▼                    │ 401 → clear │
//!        │ PollUpdate   │  typed API ──▶ ApiGateway ───┘             │
//!        └──────────────│  PollHandle ──▶ (HttpTransport)            │
//!                       └────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod navigation;
pub mod polling;
pub mod session;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod validation;

pub use chat::{ChatSession, VISIBLE_MESSAGES};
pub use client::FumotionClient;
pub use config::{load_config, ClientConfig, ConfigError, ConfigSource};
pub use error::{ClientError, Result};
pub use gateway::{
    ApiGateway, HttpRequest, HttpResponse, HttpTransport, Method, Payload, ReqwestTransport,
    RequestEnvelope, ResponseEnvelope, TransportError,
};
pub use models::{
    Booking, BookingDecision, BookingStatus, Conversation, Message, NewTrip, ProfileUpdate,
    RecordId, Review, Statistics, Trip, TripPage, TripSearch, TripStatus, TripUpdate, User,
    UserReviews,
};
pub use navigation::{NavParams, NavigationController, NavigationState, Screen};
pub use polling::{PollHandle, PollUpdate, ThreadSource, DEFAULT_POLL_INTERVAL};
pub use session::{Session, SessionStore};
pub use validation::{RegistrationForm, TripForm, ValidationError};
