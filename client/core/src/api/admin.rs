//! Administration calls
//!
//! The service enforces admin rights; these wrappers only shape requests.

use crate::error::Result;
use crate::gateway::ApiGateway;
use crate::models::{Booking, ProfileUpdate, RecordId, Statistics, Trip, User};

pub struct AdminApi<'a> {
    gateway: &'a ApiGateway,
}

impl<'a> AdminApi<'a> {
    pub fn new(gateway: &'a ApiGateway) -> Self {
        Self { gateway }
    }

    pub async fn statistics(&self) -> Result<Statistics> {
        self.gateway
            .get("/api/admin/statistics")
            .await?
            .field_or_default("stats")
    }

    pub async fn users(&self) -> Result<Vec<User>> {
        self.gateway
            .get("/api/admin/users")
            .await?
            .field_or_default("users")
    }

    pub async fn update_user(&self, user_id: RecordId, update: &ProfileUpdate) -> Result<()> {
        self.gateway
            .put(format!("/api/admin/users/{user_id}"), update)
            .await?;
        Ok(())
    }

    pub async fn delete_user(&self, user_id: RecordId) -> Result<()> {
        self.gateway
            .delete(format!("/api/admin/users/{user_id}"))
            .await?;
        Ok(())
    }

    pub async fn trips(&self) -> Result<Vec<Trip>> {
        self.gateway
            .get("/api/admin/trips")
            .await?
            .field_or_default("trips")
    }

    pub async fn delete_trip(&self, trip_id: RecordId) -> Result<()> {
        self.gateway
            .delete(format!("/api/admin/trips/{trip_id}"))
            .await?;
        Ok(())
    }

    pub async fn bookings(&self) -> Result<Vec<Booking>> {
        self.gateway
            .get("/api/admin/bookings")
            .await?
            .field_or_default("bookings")
    }

    pub async fn delete_booking(&self, booking_id: RecordId) -> Result<()> {
        self.gateway
            .delete(format!("/api/admin/bookings/{booking_id}"))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Method;
    use crate::test_utils::{sample_admin, signed_in, test_gateway, user_json, MockTransport};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_statistics_and_users() {
        let transport = MockTransport::new();
        transport.push_json(
            200,
            json!({ "success": true, "stats": { "totalUsers": 3, "totalTrips": 2, "totalBookings": 5, "activeTrips": 1 } }),
        );
        transport.push_json(200, json!({ "success": true, "users": [user_json(1), user_json(2)] }));
        let gateway = test_gateway(&transport, signed_in(sample_admin(1)));

        let stats = gateway.admin().statistics().await.unwrap();
        assert_eq!(stats.total_bookings, 5);
        let users = gateway.admin().users().await.unwrap();
        assert_eq!(users.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_paths() {
        let transport = MockTransport::new();
        transport.set_fallback_json(200, json!({ "success": true }));
        let gateway = test_gateway(&transport, signed_in(sample_admin(1)));

        assert_ok!(gateway.admin().delete_user(3).await);
        assert_ok!(gateway.admin().delete_trip(4).await);
        assert_ok!(gateway.admin().delete_booking(5).await);

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "https://fumotion.test/api/admin/users/3",
                "https://fumotion.test/api/admin/trips/4",
                "https://fumotion.test/api/admin/bookings/5",
            ]
        );
        assert!(transport.requests().iter().all(|r| r.method == Method::Delete));
    }
}
