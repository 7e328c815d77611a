//! Client Error Types
//!
//! Every operation a screen can trigger resolves to a [`ClientError`].
//! The variants follow the gateway's classification of an outcome:
//!
//! - `Validation`: rejected locally, no request was sent
//! - `Auth`: the service answered 401 and the session has been cleared
//! - `Api`: any other non-2xx answer
//! - `Transport`: no answer at all (service unreachable)
//! - `Decode`: a 2xx answer whose payload lacked the expected shape

use thiserror::Error;

use crate::gateway::{Payload, TransportError};
use crate::validation::ValidationError;

/// Fallback alert text when the service did not explain itself
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors surfaced by the client runtime
#[derive(Debug, Error)]
pub enum ClientError {
    /// Input rejected before any network call
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The service rejected our credentials (HTTP 401)
    #[error("Authentication required: {message}")]
    Auth {
        /// Message reported by the service
        message: String,
    },

    /// The service answered with a non-2xx status other than 401
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Server message, status text, or "API Error"
        message: String,
        /// Raw response payload
        payload: Payload,
    },

    /// The request never produced a response
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A successful response did not contain what we expected
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Whether this error invalidated the session
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Whether the service could not be reached
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// HTTP status attached to this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { .. } => Some(401),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text suitable for an alert or inline error line
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Auth { message } | Self::Api { message, .. } if !message.is_empty() => {
                message.clone()
            }
            Self::Transport(_) => "Cannot reach the Fumotion service.".to_string(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Convenience alias used across the crate
pub type Result<T, E = ClientError> = std::result::Result<T, E>;
