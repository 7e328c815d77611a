//! Booking calls

use serde_json::json;

use crate::error::Result;
use crate::gateway::ApiGateway;
use crate::models::{Booking, BookingDecision, RecordId, Trip};
use crate::validation::check_booking_seats;

pub struct BookingsApi<'a> {
    gateway: &'a ApiGateway,
}

impl<'a> BookingsApi<'a> {
    pub fn new(gateway: &'a ApiGateway) -> Self {
        Self { gateway }
    }

    /// Reserve `seats` on `trip`.
    ///
    /// The seat count is checked against the trip's `available_seats` first;
    /// an over-booking never reaches the service.
    pub async fn book(&self, trip: &Trip, seats: i64) -> Result<Booking> {
        check_booking_seats(trip, seats)?;
        self.gateway
            .post(
                format!("/api/bookings/trips/{}/book", trip.id),
                &json!({ "seats_booked": seats }),
            )
            .await?
            .field("booking")
    }

    /// Bookings the current user made as a passenger
    pub async fn mine(&self) -> Result<Vec<Booking>> {
        self.gateway
            .get("/api/bookings")
            .await?
            .field_or_default("bookings")
    }

    pub async fn get(&self, booking_id: RecordId) -> Result<Booking> {
        self.gateway
            .get(format!("/api/bookings/{booking_id}"))
            .await?
            .field("booking")
    }

    pub async fn cancel(&self, booking_id: RecordId) -> Result<()> {
        self.gateway
            .put_empty(format!("/api/bookings/{booking_id}/cancel"))
            .await?;
        Ok(())
    }

    /// Driver confirms or rejects a request on one of their trips
    pub async fn set_status(&self, booking_id: RecordId, decision: BookingDecision) -> Result<()> {
        self.gateway
            .put(
                format!("/api/bookings/{booking_id}/status"),
                &json!({ "status": decision }),
            )
            .await?;
        Ok(())
    }

    /// Bookings received on trips the current user drives
    pub async fn for_my_trips(&self) -> Result<Vec<Booking>> {
        self.gateway
            .get("/api/bookings/my-trips")
            .await?
            .field_or_default("bookings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::test_utils::{sample_trip, sample_user, signed_in, test_gateway, MockTransport};
    use crate::validation::ValidationError;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    #[tokio::test]
    async fn test_overbooking_sends_nothing() {
        let transport = MockTransport::new();
        let gateway = test_gateway(&transport, signed_in(sample_user(1)));
        let trip = sample_trip(5, 2);

        let err = gateway.bookings().book(&trip, 3).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Validation(ValidationError::NotEnoughSeats {
                requested: 3,
                available: 2
            })
        ));
        assert_eq!(transport.request_count(), 0);

        let err = gateway.bookings().book(&trip, 0).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Validation(ValidationError::InvalidSeatCount)
        ));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_book_within_capacity() {
        let transport = MockTransport::new();
        transport.push_json(
            201,
            json!({
                "success": true,
                "booking": { "id": 11, "trip_id": 5, "passenger_id": 1, "seats_booked": 2, "status": "pending" }
            }),
        );
        let gateway = test_gateway(&transport, signed_in(sample_user(1)));

        let booking = gateway.bookings().book(&sample_trip(5, 2), 2).await.unwrap();
        assert_eq!(booking.id, 11);

        let sent = &transport.requests()[0];
        assert_eq!(sent.url, "https://fumotion.test/api/bookings/trips/5/book");
        let body: Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({ "seats_booked": 2 }));
    }

    #[tokio::test]
    async fn test_set_status_body() {
        let transport = MockTransport::new();
        transport.push_json(200, json!({ "success": true }));
        let gateway = test_gateway(&transport, signed_in(sample_user(2)));

        gateway
            .bookings()
            .set_status(11, BookingDecision::Rejected)
            .await
            .unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.url, "https://fumotion.test/api/bookings/11/status");
        let body: Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({ "status": "rejected" }));
    }
}
