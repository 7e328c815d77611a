//! Review calls

use serde::Serialize;

use crate::error::Result;
use crate::gateway::ApiGateway;
use crate::models::{Booking, RecordId, Review, UserReviews};
use crate::validation::check_rating;

#[derive(Serialize)]
struct NewReview<'a> {
    rating: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
}

pub struct ReviewsApi<'a> {
    gateway: &'a ApiGateway,
}

impl<'a> ReviewsApi<'a> {
    pub fn new(gateway: &'a ApiGateway) -> Self {
        Self { gateway }
    }

    /// Review the other party of a completed booking; rating must be 1..=5
    pub async fn create(
        &self,
        booking_id: RecordId,
        rating: i64,
        comment: Option<&str>,
    ) -> Result<Option<Review>> {
        check_rating(rating)?;
        let body = NewReview {
            rating,
            comment: comment.map(str::trim).filter(|c| !c.is_empty()),
        };
        let response = self
            .gateway
            .post(format!("/api/reviews/bookings/{booking_id}"), &body)
            .await?;
        Ok(response.field::<Review>("review").ok())
    }

    /// Bookings still waiting for the current user's review
    pub async fn pending(&self) -> Result<Vec<Booking>> {
        self.gateway
            .get("/api/reviews/pending")
            .await?
            .field_or_default("reviews")
    }

    /// Whether the current user already reviewed this booking
    pub async fn exists(&self, booking_id: RecordId) -> Result<bool> {
        self.gateway
            .get(format!("/api/reviews/check/{booking_id}"))
            .await?
            .field_or_default("exists")
    }

    pub async fn for_user(&self, user_id: RecordId) -> Result<UserReviews> {
        let response = self
            .gateway
            .get(format!("/api/reviews/user/{user_id}"))
            .await?;
        Ok(UserReviews {
            reviews: response.field_or_default("reviews")?,
            average: response.field_or_default("average")?,
        })
    }
}
