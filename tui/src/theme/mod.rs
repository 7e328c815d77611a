//! Theme and Colors
//!
//! Fumotion's terminal palette. Teal is the brand accent; status colors
//! follow trip and booking lifecycles.

use ratatui::style::{Color, Modifier, Style};

use fumotion_core::{BookingStatus, TripStatus};

// ============================================================================
// Brand
// ============================================================================

/// Fumotion teal (titles, focus, selection)
pub const FUMOTION_TEAL: Color = Color::Rgb(0, 184, 169);

/// Muted teal for borders
pub const FUMOTION_TEAL_DIM: Color = Color::Rgb(0, 110, 100);

// ============================================================================
// UI Colors
// ============================================================================

/// Secondary text
pub const DIM_GRAY: Color = Color::Rgb(110, 110, 110);

/// Own chat messages
pub const OWN_MESSAGE: Color = Color::Rgb(130, 220, 130);

/// Counterpart chat messages
pub const OTHER_MESSAGE: Color = Color::Rgb(150, 180, 255);

pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

pub const WARNING_AMBER: Color = Color::Rgb(255, 191, 0);

// ============================================================================
// Styles
// ============================================================================

pub fn title() -> Style {
    Style::default()
        .fg(FUMOTION_TEAL)
        .add_modifier(Modifier::BOLD)
}

pub fn border() -> Style {
    Style::default().fg(FUMOTION_TEAL_DIM)
}

pub fn dim() -> Style {
    Style::default().fg(DIM_GRAY)
}

pub fn highlight() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(FUMOTION_TEAL)
        .add_modifier(Modifier::BOLD)
}

pub fn trip_status(status: TripStatus) -> Style {
    let color = match status {
        TripStatus::Active => SUCCESS_GREEN,
        TripStatus::Completed => DIM_GRAY,
        TripStatus::Cancelled => ERROR_RED,
        TripStatus::Unknown => WARNING_AMBER,
    };
    Style::default().fg(color)
}

pub fn booking_status(status: BookingStatus) -> Style {
    let color = match status {
        BookingStatus::Confirmed => SUCCESS_GREEN,
        BookingStatus::Pending => WARNING_AMBER,
        BookingStatus::Cancelled | BookingStatus::Rejected => ERROR_RED,
        BookingStatus::Unknown => DIM_GRAY,
    };
    Style::default().fg(color)
}
