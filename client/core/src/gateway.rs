//! API Gateway
//!
//! The single component permitted to perform network I/O. Every request to
//! the Fumotion service goes through [`ApiGateway::request`], which
//!
//! - builds the URL from the configured base address,
//! - attaches `Content-Type: application/json` and the session's bearer token,
//! - decodes the body as JSON when the response says so (text otherwise),
//! - classifies the outcome into success, [`ClientError::Auth`] (after
//!   clearing the session), [`ClientError::Api`] or [`ClientError::Transport`].
//!
//! One attempt per request: no retry, no backoff, no timeout beyond the
//! transport's own.
//!
//! # Transport Seam
//!
//! The HTTP exchange itself sits behind [`HttpTransport`]. Production uses
//! [`ReqwestTransport`]; tests script responses with
//! [`crate::test_utils::MockTransport`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::{ClientError, Result};
use crate::session::SessionStore;

/// Path of the reachability probe
pub const HEALTH_PATH: &str = "/api/health";

/// Message used when neither the body nor the status line explains a failure
pub const FALLBACK_ERROR_MESSAGE: &str = "API Error";

// =============================================================================
// Envelopes
// =============================================================================

/// HTTP verbs used by the API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a caller asks the gateway to send
#[derive(Clone, Debug, PartialEq)]
pub struct RequestEnvelope {
    pub method: Method,
    /// Path relative to the base address, starting with `/`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestEnvelope {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A decoded response body
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Json(Value),
    /// Body of a non-JSON response, kept as-is
    Text(String),
}

impl Payload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// The envelope's `message` field, when there is one
    pub fn message(&self) -> Option<&str> {
        self.as_json()?
            .get("message")?
            .as_str()
            .filter(|m| !m.is_empty())
    }
}

/// A successful (2xx) response
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub payload: Payload,
}

impl ResponseEnvelope {
    fn raw_field(&self, name: &str) -> Option<&Value> {
        self.payload
            .as_json()?
            .get(name)
            .filter(|value| !value.is_null())
    }

    /// Decode a required payload field
    pub fn field<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self
            .raw_field(name)
            .ok_or_else(|| ClientError::Decode(format!("missing field `{name}`")))?;
        T::deserialize(value)
            .map_err(|e| ClientError::Decode(format!("field `{name}`: {e}")))
    }

    /// Decode an optional payload field, `Default` when absent
    pub fn field_or_default<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        match self.raw_field(name) {
            Some(value) => T::deserialize(value)
                .map_err(|e| ClientError::Decode(format!("field `{name}`: {e}"))),
            None => Ok(T::default()),
        }
    }

    /// The envelope's `success` flag (absent counts as success)
    pub fn success_flag(&self) -> bool {
        self.raw_field("success")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }
}

// =============================================================================
// Transport Seam
// =============================================================================

/// A fully resolved HTTP request
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A raw HTTP response
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase, may be empty
    pub status_text: String,
    pub content_type: Option<String>,
    pub body: String,
}

/// The request produced no response
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Cannot connect to service: {0}")]
    Connect(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Transport failure: {0}")]
    Other(String),
}

/// Performs one HTTP exchange
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

/// `reqwest`-backed transport
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else {
            Self::Other(e.to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.http_client.request(method, &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            content_type,
            body,
        })
    }
}

// =============================================================================
// Gateway
// =============================================================================

/// Single chokepoint for outbound requests
#[derive(Clone)]
pub struct ApiGateway {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    session: Arc<SessionStore>,
}

impl fmt::Debug for ApiGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiGateway {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        session: Arc<SessionStore>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
            session,
        }
    }

    /// Gateway over the production `reqwest` transport
    pub fn with_reqwest(base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        Self::new(base_url, Arc::new(ReqwestTransport::new()), session)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Send one request and classify the outcome
    pub async fn request(&self, envelope: RequestEnvelope) -> Result<ResponseEnvelope> {
        let RequestEnvelope {
            method,
            path,
            query,
            body,
        } = envelope;

        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(token) = self.session.token() {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        let request = HttpRequest {
            method,
            url: self.url(&path),
            query,
            headers,
            body: body.map(|value| value.to_string()),
        };

        tracing::debug!(method = %method, path = %path, "API request");

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(method = %method, path = %path, error = %e, "API unreachable");
                return Err(ClientError::Transport(e));
            }
        };

        let payload = decode_body(&response);
        let status = response.status;

        if (200..300).contains(&status) {
            tracing::debug!(method = %method, path = %path, status, "API response");
            return Ok(ResponseEnvelope { status, payload });
        }

        let message = payload
            .message()
            .map(str::to_string)
            .or_else(|| Some(response.status_text.clone()).filter(|s| !s.is_empty()))
            .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());

        if status == 401 {
            tracing::warn!(method = %method, path = %path, "Unauthorized, clearing session");
            self.session.clear();
            return Err(ClientError::Auth { message });
        }

        tracing::debug!(method = %method, path = %path, status, message = %message, "API error");
        Err(ClientError::Api {
            status,
            message,
            payload,
        })
    }

    pub async fn get(&self, path: impl Into<String>) -> Result<ResponseEnvelope> {
        self.request(RequestEnvelope::new(Method::Get, path)).await
    }

    pub async fn get_with_query(
        &self,
        path: impl Into<String>,
        query: Vec<(String, String)>,
    ) -> Result<ResponseEnvelope> {
        self.request(RequestEnvelope::new(Method::Get, path).with_query(query))
            .await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: impl Into<String>,
        body: &B,
    ) -> Result<ResponseEnvelope> {
        self.request(RequestEnvelope::new(Method::Post, path).with_body(to_json(body)?))
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: impl Into<String>,
        body: &B,
    ) -> Result<ResponseEnvelope> {
        self.request(RequestEnvelope::new(Method::Put, path).with_body(to_json(body)?))
            .await
    }

    /// PUT with no body
    pub async fn put_empty(&self, path: impl Into<String>) -> Result<ResponseEnvelope> {
        self.request(RequestEnvelope::new(Method::Put, path)).await
    }

    pub async fn delete(&self, path: impl Into<String>) -> Result<ResponseEnvelope> {
        self.request(RequestEnvelope::new(Method::Delete, path)).await
    }

    /// Reachability probe (`GET /api/health`). Only a 2xx answer counts as
    /// reachable.
    pub async fn health_check(&self) -> bool {
        match self.get(HEALTH_PATH).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Health check failed");
                false
            }
        }
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<Value> {
    serde_json::to_value(body).map_err(|e| ClientError::Decode(format!("request body: {e}")))
}

fn decode_body(response: &HttpResponse) -> Payload {
    let is_json = response
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.contains("application/json"));

    if is_json {
        if let Ok(value) = serde_json::from_str(&response.body) {
            return Payload::Json(value);
        }
    }
    Payload::Text(response.body.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::test_utils::{sample_user, MockTransport};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn gateway_with(transport: &MockTransport, session: Session) -> ApiGateway {
        ApiGateway::new(
            "https://fumotion.test/",
            Arc::new(transport.clone()),
            Arc::new(SessionStore::in_memory(session)),
        )
    }

    fn signed_in() -> Session {
        Session {
            token: Some("abc".into()),
            user: Some(sample_user(1)),
        }
    }

    #[tokio::test]
    async fn test_headers_and_url() {
        let transport = MockTransport::new();
        transport.push_json(200, json!({ "success": true }));
        let gateway = gateway_with(&transport, signed_in());

        gateway
            .post("/api/messages", &json!({ "receiver_id": 2, "message": "hi" }))
            .await
            .unwrap();

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::Post);
        assert_eq!(sent[0].url, "https://fumotion.test/api/messages");
        assert_eq!(sent[0].header("content-type"), Some("application/json"));
        assert_eq!(sent[0].header("authorization"), Some("Bearer abc"));
        let body: Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({ "receiver_id": 2, "message": "hi" }));
    }

    #[tokio::test]
    async fn test_no_token_no_authorization_header() {
        let transport = MockTransport::new();
        transport.push_json(200, json!({}));
        let gateway = gateway_with(&transport, Session::default());

        gateway.get("/api/trips/search").await.unwrap();
        assert_eq!(transport.requests()[0].header("authorization"), None);
    }

    #[tokio::test]
    async fn test_unauthorized_clears_session() {
        let transport = MockTransport::new();
        transport.push_json(401, json!({ "success": false, "message": "Token expired" }));
        let gateway = gateway_with(&transport, signed_in());

        let err = gateway.get("/api/bookings").await.unwrap_err();
        assert!(matches!(err, ClientError::Auth { ref message } if message == "Token expired"));
        assert!(!gateway.session().is_authenticated());
        assert_eq!(gateway.session().token(), None);
    }

    #[tokio::test]
    async fn test_error_message_resolution() {
        let transport = MockTransport::new();
        transport.push_json(400, json!({ "message": "Not enough seats" }));
        transport.push_text(503, "Service Unavailable", "<html>down</html>");
        transport.push_text(500, "", "");
        let gateway = gateway_with(&transport, Session::default());

        let err = gateway.get("/a").await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 400, ref message, .. } if message == "Not enough seats"));

        let err = gateway.get("/b").await.unwrap_err();
        match err {
            ClientError::Api {
                status,
                message,
                payload,
            } => {
                assert_eq!(status, 503);
                assert_eq!(message, "Service Unavailable");
                assert_eq!(payload, Payload::Text("<html>down</html>".into()));
            }
            other => panic!("unexpected {other:?}"),
        }

        let err = gateway.get("/c").await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 500, ref message, .. } if message == FALLBACK_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let transport = MockTransport::new();
        transport.push_unreachable();
        let gateway = gateway_with(&transport, signed_in());

        let err = gateway.get("/api/trips").await.unwrap_err();
        assert!(err.is_transport());
        assert!(gateway.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_invalid_json_kept_as_text() {
        let transport = MockTransport::new();
        transport.push(HttpResponse {
            status: 200,
            status_text: "OK".into(),
            content_type: Some("application/json; charset=utf-8".into()),
            body: "not json".into(),
        });
        let gateway = gateway_with(&transport, Session::default());

        let response = gateway.get("/x").await.unwrap();
        assert_eq!(response.payload, Payload::Text("not json".into()));
    }

    #[tokio::test]
    async fn test_health_check() {
        let transport = MockTransport::new();
        transport.push_json(200, json!({ "status": "ok" }));
        transport.push_text(500, "Internal Server Error", "");
        transport.push_unreachable();
        let gateway = gateway_with(&transport, Session::default());

        assert!(gateway.health_check().await);
        assert!(!gateway.health_check().await);
        assert!(!gateway.health_check().await);
        assert_eq!(transport.request_count(), 3);
        assert_eq!(transport.requests()[0].url, "https://fumotion.test/api/health");
    }

    #[test]
    fn test_field_extraction() {
        let response = ResponseEnvelope {
            status: 200,
            payload: Payload::Json(json!({ "total": 3, "trips": null, "success": false })),
        };
        assert_eq!(response.field::<i64>("total").unwrap(), 3);
        assert!(response.field::<i64>("missing").is_err());
        assert!(response.field::<Vec<i64>>("trips").is_err());
        assert_eq!(response.field_or_default::<Vec<i64>>("trips").unwrap(), Vec::<i64>::new());
        assert!(!response.success_flag());
    }
}
