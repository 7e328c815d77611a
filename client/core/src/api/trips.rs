//! Trip calls

use crate::error::Result;
use crate::gateway::ApiGateway;
use crate::models::{NewTrip, RecordId, Trip, TripPage, TripSearch, TripUpdate};

pub struct TripsApi<'a> {
    gateway: &'a ApiGateway,
}

impl<'a> TripsApi<'a> {
    pub fn new(gateway: &'a ApiGateway) -> Self {
        Self { gateway }
    }

    /// `GET /api/trips/search`
    pub async fn search(&self, filters: &TripSearch) -> Result<TripPage> {
        let response = self
            .gateway
            .get_with_query("/api/trips/search", filters.query())
            .await?;
        let trips: Vec<Trip> = response.field_or_default("trips")?;
        let total = match response.field_or_default::<Option<i64>>("total")? {
            Some(total) => total,
            None => trips.len() as i64,
        };
        Ok(TripPage { trips, total })
    }

    pub async fn get(&self, trip_id: RecordId) -> Result<Trip> {
        self.gateway
            .get(format!("/api/trips/{trip_id}"))
            .await?
            .field("trip")
    }

    /// Publish a trip (body from [`crate::validation::TripForm::validate`])
    pub async fn create(&self, trip: &NewTrip) -> Result<Trip> {
        self.gateway.post("/api/trips", trip).await?.field("trip")
    }

    pub async fn update(&self, trip_id: RecordId, changes: &TripUpdate) -> Result<Trip> {
        self.gateway
            .put(format!("/api/trips/{trip_id}"), changes)
            .await?
            .field("trip")
    }

    pub async fn complete(&self, trip_id: RecordId) -> Result<()> {
        self.gateway
            .put_empty(format!("/api/trips/{trip_id}/complete"))
            .await?;
        Ok(())
    }

    /// Cancel a trip (`DELETE /api/trips/:id`)
    pub async fn cancel(&self, trip_id: RecordId) -> Result<()> {
        self.gateway
            .delete(format!("/api/trips/{trip_id}"))
            .await?;
        Ok(())
    }

    /// Trips the current user drives
    pub async fn mine(&self) -> Result<Vec<Trip>> {
        self.gateway.get("/api/trips").await?.field_or_default("trips")
    }
}
