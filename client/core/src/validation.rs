//! Client-side Input Validation
//!
//! Checks that run before a request is built. A failure here means the
//! network was never touched.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::models::{NewTrip, Registration, Trip};

/// Minimum accepted password length at registration
pub const MIN_PASSWORD_LEN: usize = 6;

/// Seats offered when the create-trip form leaves the field blank
pub const DEFAULT_TRIP_SEATS: i64 = 3;

/// Price per seat when the create-trip form leaves the field blank
pub const DEFAULT_TRIP_PRICE: f64 = 5.0;

/// Accepted review ratings
pub const RATING_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

/// Reasons user input is rejected locally
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("Invalid {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Seat count must be at least 1")]
    InvalidSeatCount,

    #[error("Only {available} seat(s) available, {requested} requested")]
    NotEnoughSeats { requested: i64, available: i64 },

    #[error("Rating must be between 1 and 5")]
    RatingOutOfRange(i64),

    #[error("Message cannot be empty")]
    EmptyMessage,
}

fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

/// Login form: both fields must be filled in
pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    require("Email", email)?;
    if password.is_empty() {
        return Err(ValidationError::MissingField("Password"));
    }
    Ok(())
}

/// Raw registration form input
#[derive(Clone, Debug, Default)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Check the form and build the request body
    pub fn validate(&self) -> Result<Registration, ValidationError> {
        let first_name = require("First name", &self.first_name)?;
        let last_name = require("Last name", &self.last_name)?;
        let email = require("Email", &self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::MissingField("Password"));
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }

        let phone = self.phone.trim();
        Ok(Registration {
            email: email.to_string(),
            password: self.password.clone(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
        })
    }
}

/// Raw create-trip form input
#[derive(Clone, Debug, Default)]
pub struct TripForm {
    pub departure_city: String,
    pub departure_address: String,
    pub arrival_city: String,
    pub arrival_address: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub seats: String,
    pub price: String,
}

impl TripForm {
    /// Check the form and build the request body.
    ///
    /// Blank addresses fall back to the city; blank seats and price fall
    /// back to [`DEFAULT_TRIP_SEATS`] and [`DEFAULT_TRIP_PRICE`].
    pub fn validate(&self) -> Result<NewTrip, ValidationError> {
        let departure_city = require("Departure city", &self.departure_city)?;
        let arrival_city = require("Arrival city", &self.arrival_city)?;
        let date = require("Date", &self.date)?;
        let time = require("Time", &self.time)?;

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(date.to_string()))?;
        let time = NaiveTime::parse_from_str(time, "%H:%M")
            .map_err(|_| ValidationError::InvalidTime(time.to_string()))?;

        let available_seats = match self.seats.trim() {
            "" => DEFAULT_TRIP_SEATS,
            raw => parse_seat_count(raw)?,
        };
        let price_per_seat = match self.price.trim() {
            "" => DEFAULT_TRIP_PRICE,
            raw => raw
                .parse::<f64>()
                .ok()
                .filter(|p| p.is_finite() && *p >= 0.0)
                .ok_or_else(|| ValidationError::InvalidNumber {
                    field: "price",
                    value: raw.to_string(),
                })?,
        };

        let or_city = |address: &str, city: &str| match address.trim() {
            "" => city.to_string(),
            a => a.to_string(),
        };

        Ok(NewTrip {
            departure_city: departure_city.to_string(),
            departure_address: or_city(&self.departure_address, departure_city),
            arrival_city: arrival_city.to_string(),
            arrival_address: or_city(&self.arrival_address, arrival_city),
            departure_time: date.and_time(time).format("%Y-%m-%dT%H:%M:%S").to_string(),
            available_seats,
            price_per_seat,
        })
    }
}

/// Parse a seat count typed by the user (integer, at least 1)
pub fn parse_seat_count(input: &str) -> Result<i64, ValidationError> {
    let trimmed = input.trim();
    let seats: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::InvalidNumber {
            field: "seats",
            value: trimmed.to_string(),
        })?;
    if seats < 1 {
        return Err(ValidationError::InvalidSeatCount);
    }
    Ok(seats)
}

/// A booking may not ask for more seats than the trip has left
pub fn check_booking_seats(trip: &Trip, seats: i64) -> Result<(), ValidationError> {
    if seats < 1 {
        return Err(ValidationError::InvalidSeatCount);
    }
    if seats > trip.available_seats {
        return Err(ValidationError::NotEnoughSeats {
            requested: seats,
            available: trip.available_seats,
        });
    }
    Ok(())
}

pub fn check_rating(rating: i64) -> Result<(), ValidationError> {
    if RATING_RANGE.contains(&rating) {
        Ok(())
    } else {
        Err(ValidationError::RatingOutOfRange(rating))
    }
}

/// Trim a chat message, rejecting blank input
pub fn normalize_message(text: &str) -> Result<String, ValidationError> {
    match text.trim() {
        "" => Err(ValidationError::EmptyMessage),
        trimmed => Ok(trimmed.to_string()),
    }
}
