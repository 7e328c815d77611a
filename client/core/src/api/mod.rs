//! Typed API Wrappers
//!
//! Thin, fixed-shape calls over [`ApiGateway`]. Each group borrows the
//! gateway, builds its path, and decodes the named payload fields. Input
//! that fails client-side validation is rejected before a request is built.

mod admin;
mod auth;
mod bookings;
mod messages;
mod reviews;
mod trips;

pub use admin::AdminApi;
pub use auth::AuthApi;
pub use bookings::BookingsApi;
pub use messages::MessagesApi;
pub use reviews::ReviewsApi;
pub use trips::TripsApi;

use crate::gateway::ApiGateway;

impl ApiGateway {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn trips(&self) -> TripsApi<'_> {
        TripsApi::new(self)
    }

    pub fn bookings(&self) -> BookingsApi<'_> {
        BookingsApi::new(self)
    }

    pub fn messages(&self) -> MessagesApi<'_> {
        MessagesApi::new(self)
    }

    pub fn reviews(&self) -> ReviewsApi<'_> {
        ReviewsApi::new(self)
    }

    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi::new(self)
    }
}
