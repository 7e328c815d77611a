//! Domain Records
//!
//! Serde shapes for everything the Fumotion API sends and accepts.
//!
//! Decoding is tolerant: optional fields may be absent or null, admin flags
//! may arrive as `0`/`1`, prices may arrive as numeric strings, and unknown
//! status values decode to an `Unknown` variant instead of failing the whole
//! response.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier used by every record
pub type RecordId = i64;

// =============================================================================
// Users
// =============================================================================

/// An account on the service
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl User {
    /// "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// =============================================================================
// Trips
// =============================================================================

/// Lifecycle of a trip
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A published ride offer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: RecordId,
    pub driver_id: RecordId,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub driver_avatar: Option<String>,
    pub departure_city: String,
    #[serde(default)]
    pub departure_address: String,
    #[serde(default)]
    pub departure_lat: Option<f64>,
    #[serde(default)]
    pub departure_lng: Option<f64>,
    pub arrival_city: String,
    #[serde(default)]
    pub arrival_address: String,
    #[serde(default)]
    pub arrival_lat: Option<f64>,
    #[serde(default)]
    pub arrival_lng: Option<f64>,
    pub departure_time: String,
    pub available_seats: i64,
    #[serde(deserialize_with = "flexible_f64")]
    pub price_per_seat: f64,
    #[serde(default)]
    pub status: TripStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Trip {
    /// "Paris -> Lyon"
    pub fn route(&self) -> String {
        format!("{} -> {}", self.departure_city, self.arrival_city)
    }

    /// Departure timestamp with the `T` separator and seconds removed
    pub fn departure_display(&self) -> String {
        let stamp = self.departure_time.replacen('T', " ", 1);
        match stamp.char_indices().nth(16) {
            Some((cut, _)) => stamp[..cut].to_string(),
            None => stamp,
        }
    }

    pub fn is_driver(&self, user: &User) -> bool {
        self.driver_id == user.id
    }
}

/// Filters for `GET /api/trips/search`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TripSearch {
    pub departure: Option<String>,
    pub arrival: Option<String>,
    pub date: Option<String>,
    pub page: Option<u32>,
}

impl TripSearch {
    /// Query pairs with blank filters left out
    pub fn query(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let mut push = |key: &str, value: &Option<String>| {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                pairs.push((key.to_string(), v.to_string()));
            }
        };
        push("departure", &self.departure);
        push("arrival", &self.arrival);
        push("date", &self.date);
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        pairs
    }
}

/// One page of search results
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TripPage {
    pub trips: Vec<Trip>,
    pub total: i64,
}

/// Body of `POST /api/trips`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewTrip {
    pub departure_city: String,
    pub departure_address: String,
    pub arrival_city: String,
    pub arrival_address: String,
    /// `YYYY-MM-DDTHH:MM:00`
    pub departure_time: String,
    pub available_seats: i64,
    pub price_per_seat: f64,
}

/// Body of `PUT /api/trips/:id`; unset fields are left untouched
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TripUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_seats: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_seat: Option<f64>,
}

// =============================================================================
// Bookings
// =============================================================================

/// Lifecycle of a booking
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Rejected => write!(f, "rejected"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A driver's answer to a booking request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingDecision {
    Confirmed,
    Rejected,
}

/// A passenger's seat reservation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: RecordId,
    pub trip_id: RecordId,
    pub passenger_id: RecordId,
    pub seats_booked: i64,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub trip: Option<Trip>,
    #[serde(default)]
    pub passenger: Option<User>,
}

impl Booking {
    pub fn is_cancellable(&self) -> bool {
        matches!(self.status, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

// =============================================================================
// Messages
// =============================================================================

/// One chat message
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: RecordId,
    pub sender_id: RecordId,
    pub receiver_id: RecordId,
    #[serde(default)]
    pub trip_id: Option<RecordId>,
    pub message: String,
    pub created_at: String,
    #[serde(default)]
    pub read_at: Option<String>,
}

/// Summary row of the conversation list
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub user_id: RecordId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub last_message: String,
    #[serde(default)]
    pub last_message_time: String,
    #[serde(default)]
    pub unread_count: i64,
}

/// Body of `POST /api/messages`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutgoingMessage {
    pub receiver_id: RecordId,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<RecordId>,
}

// =============================================================================
// Reviews
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: RecordId,
    pub booking_id: RecordId,
    pub reviewer_id: RecordId,
    pub reviewed_user_id: RecordId,
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Reviews received by one user
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserReviews {
    pub reviews: Vec<Review>,
    pub average: Option<f64>,
}

// =============================================================================
// Auth & admin
// =============================================================================

/// Body of `POST /api/auth/register`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Body of `PUT /api/auth/profile` and `PUT /api/admin/users/:id`
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

/// Dashboard counters from `GET /api/admin/statistics`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Statistics {
    pub total_users: i64,
    pub total_trips: i64,
    pub total_bookings: i64,
    pub active_trips: i64,
}

// =============================================================================
// Tolerant decoders
// =============================================================================

fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Null(()),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
        Flag::Null(()) => false,
    })
}

fn flexible_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Float(f64),
        Text(String),
    }

    match Number::deserialize(deserializer)? {
        Number::Float(n) => Ok(n),
        Number::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn trip_json() -> serde_json::Value {
        json!({
            "id": 7,
            "driver_id": 2,
            "driver_name": "Ana Lopez",
            "departure_city": "Paris",
            "departure_address": "Gare de Lyon",
            "arrival_city": "Lyon",
            "arrival_address": "Part-Dieu",
            "departure_time": "2026-05-01T08:30:00",
            "available_seats": 2,
            "price_per_seat": "12.50",
            "status": "active"
        })
    }

    #[test]
    fn test_user_admin_flag_accepts_integers() {
        let user: User = serde_json::from_value(json!({
            "id": 1, "email": "a@b.c", "first_name": "A", "last_name": "B", "is_admin": 1
        }))
        .unwrap();
        assert!(user.is_admin);

        let user: User = serde_json::from_value(json!({
            "id": 1, "email": "a@b.c", "first_name": "A", "last_name": "B", "is_admin": null
        }))
        .unwrap();
        assert!(!user.is_admin);

        let user: User = serde_json::from_value(json!({
            "id": 1, "email": "a@b.c", "first_name": "A", "last_name": "B"
        }))
        .unwrap();
        assert!(!user.is_admin);
        assert_eq!(user.full_name(), "A B");
    }

    #[test]
    fn test_trip_price_from_string() {
        let trip: Trip = serde_json::from_value(trip_json()).unwrap();
        assert_eq!(trip.price_per_seat, 12.5);
        assert_eq!(trip.route(), "Paris -> Lyon");
        assert_eq!(trip.departure_display(), "2026-05-01 08:30");
    }

    #[test]
    fn test_unknown_status_does_not_fail() {
        let mut value = trip_json();
        value["status"] = json!("archived");
        let trip: Trip = serde_json::from_value(value).unwrap();
        assert_eq!(trip.status, TripStatus::Unknown);

        let booking: Booking = serde_json::from_value(json!({
            "id": 1, "trip_id": 7, "passenger_id": 3, "seats_booked": 1, "status": "waitlisted"
        }))
        .unwrap();
        assert_eq!(booking.status, BookingStatus::Unknown);
        assert!(!booking.is_cancellable());
    }

    #[test]
    fn test_search_query_skips_blank_filters() {
        let search = TripSearch {
            departure: Some("Paris".into()),
            arrival: Some("   ".into()),
            date: None,
            page: Some(2),
        };
        assert_eq!(
            search.query(),
            vec![
                ("departure".to_string(), "Paris".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_statistics_camel_case() {
        let stats: Statistics = serde_json::from_value(json!({
            "totalUsers": 10, "totalTrips": 4, "totalBookings": 9, "activeTrips": 3
        }))
        .unwrap();
        assert_eq!(
            stats,
            Statistics {
                total_users: 10,
                total_trips: 4,
                total_bookings: 9,
                active_trips: 3,
            }
        );
    }

    #[test]
    fn test_profile_update_omits_unset_fields() {
        let update = ProfileUpdate {
            phone: Some("0600".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "phone": "0600" }));
    }
}
