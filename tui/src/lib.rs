//! Fumotion TUI - terminal client for the Fumotion carpooling service
//!
//! # Architecture
//!
//! - **App**: event loop, action dispatch, header and status line
//! - **Screens**: one view per navigation screen, loading through the typed API
//! - **Widgets**: forms, selectable lists, scrollable text blocks
//! - **Theme**: colors and styles
//!
//! Session, HTTP, navigation guards and chat polling live in `fumotion-core`.

pub mod app;
pub mod screens;
pub mod theme;
pub mod widgets;

pub use app::{Alert, App};
