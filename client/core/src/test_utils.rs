//! Test Utilities
//!
//! A scripted [`HttpTransport`] and sample records shared by unit tests,
//! integration tests and the terminal surface's tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::gateway::{ApiGateway, HttpRequest, HttpResponse, HttpTransport, TransportError};
use crate::models::{Trip, TripStatus, User};
use crate::session::{Session, SessionStore};

/// Base address used by test gateways
pub const TEST_BASE_URL: &str = "https://fumotion.test";

type Scripted = Result<HttpResponse, TransportError>;

#[derive(Default)]
struct MockState {
    queue: Mutex<VecDeque<Scripted>>,
    fallback: Mutex<Option<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Mutex<Option<Duration>>,
}

/// Transport that replays scripted responses in order and records every request.
///
/// When the script runs out, the fallback response (if any) is repeated;
/// otherwise the request fails as unreachable.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<MockState>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: HttpResponse) {
        self.state.queue.lock().push_back(Ok(response));
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push(json_response(status, body));
    }

    pub fn push_text(&self, status: u16, status_text: &str, body: &str) {
        self.push(HttpResponse {
            status,
            status_text: status_text.to_string(),
            content_type: Some("text/html".to_string()),
            body: body.to_string(),
        });
    }

    pub fn push_unreachable(&self) {
        self.state
            .queue
            .lock()
            .push_back(Err(TransportError::Connect("connection refused".into())));
    }

    /// Response repeated once the script is exhausted
    pub fn set_fallback_json(&self, status: u16, body: Value) {
        *self.state.fallback.lock() = Some(Ok(json_response(status, body)));
    }

    /// Hold every response for `delay` (tokio time, so paused clocks apply)
    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock() = Some(delay);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().len()
    }

    /// Number of requests whose URL ends with `path`
    pub fn count_path(&self, path: &str) -> usize {
        self.state
            .requests
            .lock()
            .iter()
            .filter(|r| r.url.ends_with(path))
            .count()
    }

    /// Highest number of requests observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.state.requests.lock().push(request);

        let now = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.state.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.state.queue.lock().pop_front();
        let result = match scripted {
            Some(result) => result,
            None => self
                .state
                .fallback
                .lock()
                .clone()
                .unwrap_or_else(|| Err(TransportError::Other("no scripted response".into()))),
        };

        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// In-memory gateway over `transport`
pub fn test_gateway(transport: &MockTransport, session: Session) -> ApiGateway {
    ApiGateway::new(
        TEST_BASE_URL,
        Arc::new(transport.clone()),
        Arc::new(SessionStore::in_memory(session)),
    )
}

/// Session holding token `"abc"` for `user`
pub fn signed_in(user: User) -> Session {
    Session {
        token: Some("abc".into()),
        user: Some(user),
    }
}

pub fn json_response(status: u16, body: Value) -> HttpResponse {
    HttpResponse {
        status,
        status_text: String::new(),
        content_type: Some("application/json; charset=utf-8".to_string()),
        body: body.to_string(),
    }
}

pub fn user_json(id: i64) -> Value {
    json!({
        "id": id,
        "email": format!("user{id}@example.com"),
        "first_name": format!("First{id}"),
        "last_name": format!("Last{id}"),
        "is_admin": 0
    })
}

pub fn sample_user(id: i64) -> User {
    User {
        id,
        email: format!("user{id}@example.com"),
        first_name: format!("First{id}"),
        last_name: format!("Last{id}"),
        phone: None,
        avatar: None,
        is_admin: false,
        created_at: None,
    }
}

pub fn sample_admin(id: i64) -> User {
    User {
        is_admin: true,
        ..sample_user(id)
    }
}

pub fn trip_json(id: i64, available_seats: i64) -> Value {
    json!({
        "id": id,
        "driver_id": 2,
        "driver_name": "First2 Last2",
        "departure_city": "Paris",
        "departure_address": "Paris",
        "arrival_city": "Lyon",
        "arrival_address": "Lyon",
        "departure_time": "2026-05-01T08:30:00",
        "available_seats": available_seats,
        "price_per_seat": 12.5,
        "status": "active"
    })
}

pub fn sample_trip(id: i64, available_seats: i64) -> Trip {
    Trip {
        id,
        driver_id: 2,
        driver_name: Some("First2 Last2".into()),
        driver_avatar: None,
        departure_city: "Paris".into(),
        departure_address: "Paris".into(),
        departure_lat: None,
        departure_lng: None,
        arrival_city: "Lyon".into(),
        arrival_address: "Lyon".into(),
        arrival_lat: None,
        arrival_lng: None,
        departure_time: "2026-05-01T08:30:00".into(),
        available_seats,
        price_per_seat: 12.5,
        status: TripStatus::Active,
        created_at: None,
    }
}

pub fn message_json(id: i64, sender_id: i64, receiver_id: i64, text: &str) -> Value {
    json!({
        "id": id,
        "sender_id": sender_id,
        "receiver_id": receiver_id,
        "message": text,
        "created_at": "2026-05-01T08:00:00"
    })
}
