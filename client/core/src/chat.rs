//! Chat Session
//!
//! Live state behind the chat screen: the counterpart's profile, the
//! thread, a visible error, and the poll task that keeps the thread fresh.
//! Dropping the session cancels the poll task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::Result;
use crate::gateway::ApiGateway;
use crate::models::{Message, RecordId, User};
use crate::polling::{PollHandle, PollUpdate};

/// Messages shown at once on the chat screen
pub const VISIBLE_MESSAGES: usize = 10;

pub struct ChatSession {
    gateway: ApiGateway,
    counterpart_id: RecordId,
    trip_id: Option<RecordId>,
    counterpart: Option<User>,
    messages: Vec<Message>,
    error: Option<String>,
    poll: Option<PollHandle>,
}

impl ChatSession {
    /// Load profile and thread concurrently, then start polling.
    ///
    /// A failed initial load is kept as the session's error rather than
    /// returned; polling starts either way.
    pub async fn open(
        gateway: &ApiGateway,
        counterpart_id: RecordId,
        trip_id: Option<RecordId>,
        period: Duration,
        updates: mpsc::Sender<PollUpdate>,
    ) -> Self {
        let auth = gateway.auth();
        let messages = gateway.messages();
        let (profile, thread) = futures::join!(
            auth.public_profile(counterpart_id),
            messages.thread(counterpart_id)
        );

        let mut session = Self {
            gateway: gateway.clone(),
            counterpart_id,
            trip_id,
            counterpart: None,
            messages: Vec::new(),
            error: None,
            poll: None,
        };

        match profile {
            Ok(user) => session.counterpart = Some(user),
            Err(e) => session.error = Some(e.user_message()),
        }
        match thread {
            Ok(thread) => session.messages = thread,
            Err(e) => {
                session.error.get_or_insert_with(|| e.user_message());
            }
        }

        session.poll = Some(PollHandle::spawn(
            Arc::new(gateway.clone()),
            counterpart_id,
            period,
            updates,
        ));
        session
    }

    pub fn counterpart_id(&self) -> RecordId {
        self.counterpart_id
    }

    pub fn counterpart(&self) -> Option<&User> {
        self.counterpart.as_ref()
    }

    /// Display name, falling back to the id until the profile loads
    pub fn counterpart_name(&self) -> String {
        match &self.counterpart {
            Some(user) => user.full_name(),
            None => format!("User #{}", self.counterpart_id),
        }
    }

    pub fn trip_id(&self) -> Option<RecordId> {
        self.trip_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The newest `n` messages, oldest first
    pub fn recent(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_polling(&self) -> bool {
        self.poll.as_ref().is_some_and(PollHandle::is_active)
    }

    /// Replace the thread with a poll result. Returns false for updates
    /// from a handle this session does not own.
    pub fn apply(&mut self, update: PollUpdate) -> bool {
        match &self.poll {
            Some(poll) if poll.owns(&update) => {
                self.messages = update.messages;
                true
            }
            _ => {
                tracing::trace!(generation = update.generation, "Ignoring stale poll update");
                false
            }
        }
    }

    /// Send `text`, then reload the thread
    pub async fn send(&mut self, text: &str) -> Result<()> {
        self.gateway
            .messages()
            .send(self.counterpart_id, text, self.trip_id)
            .await?;

        match self.gateway.messages().thread(self.counterpart_id).await {
            Ok(thread) => {
                self.messages = thread;
                self.error = None;
            }
            Err(e) => self.error = Some(e.user_message()),
        }
        Ok(())
    }

    /// Stop polling; the session keeps its last data
    pub fn close(&mut self) {
        if let Some(poll) = self.poll.take() {
            poll.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        message_json, sample_user, signed_in, test_gateway, user_json, MockTransport,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn thread(n: i64) -> serde_json::Value {
        let messages: Vec<_> = (1..=n)
            .map(|i| message_json(i, 2, 1, &format!("m{i}")))
            .collect();
        json!({ "success": true, "messages": messages })
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_loads_profile_and_thread() {
        let transport = MockTransport::new();
        transport.push_json(200, json!({ "success": true, "user": user_json(2) }));
        transport.push_json(200, thread(12));
        let gateway = test_gateway(&transport, signed_in(sample_user(1)));
        let (tx, _rx) = mpsc::channel(4);

        let chat = ChatSession::open(&gateway, 2, Some(9), Duration::from_secs(5), tx).await;

        assert_eq!(chat.error(), None);
        assert_eq!(chat.counterpart_name(), "First2 Last2");
        assert_eq!(chat.messages().len(), 12);
        assert_eq!(chat.recent(VISIBLE_MESSAGES).len(), 10);
        assert_eq!(chat.recent(VISIBLE_MESSAGES)[0].message, "m3");
        assert!(chat.is_polling());
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_surfaces_initial_error() {
        let transport = MockTransport::new();
        transport.push_json(404, json!({ "success": false, "message": "User not found" }));
        transport.push_json(404, json!({ "success": false, "message": "User not found" }));
        let gateway = test_gateway(&transport, signed_in(sample_user(1)));
        let (tx, _rx) = mpsc::channel(4);

        let chat = ChatSession::open(&gateway, 99, None, Duration::from_secs(5), tx).await;
        assert_eq!(chat.error(), Some("User not found"));
        assert_eq!(chat.counterpart_name(), "User #99");
        assert!(chat.messages().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_updates_replace_thread() {
        let transport = MockTransport::new();
        transport.push_json(200, json!({ "success": true, "user": user_json(2) }));
        transport.push_json(200, thread(1));
        transport.set_fallback_json(200, thread(3));
        let gateway = test_gateway(&transport, signed_in(sample_user(1)));
        let (tx, mut rx) = mpsc::channel(4);

        let mut chat = ChatSession::open(&gateway, 2, None, Duration::from_secs(5), tx).await;
        let update = rx.recv().await.unwrap();
        assert!(chat.apply(update.clone()));
        assert_eq!(chat.messages().len(), 3);

        let stale = PollUpdate {
            generation: update.generation + 1_000,
            ..update
        };
        assert!(!chat.apply(stale));
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_then_reload() {
        let transport = MockTransport::new();
        transport.push_json(200, json!({ "success": true, "user": user_json(2) }));
        transport.push_json(200, thread(1));
        transport.push_json(201, json!({ "success": true, "message": message_json(2, 1, 2, "hey") }));
        transport.push_json(200, thread(2));
        let gateway = test_gateway(&transport, signed_in(sample_user(1)));
        let (tx, _rx) = mpsc::channel(4);

        let mut chat = ChatSession::open(&gateway, 2, Some(4), Duration::from_secs(5), tx).await;
        chat.send(" hey ").await.unwrap();

        assert_eq!(chat.messages().len(), 2);
        let sent = transport.requests();
        assert_eq!(sent[2].url, "https://fumotion.test/api/messages");
        assert_eq!(sent[3].url, "https://fumotion.test/api/messages/2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_stops_polling() {
        let transport = MockTransport::new();
        transport.set_fallback_json(200, thread(1));
        let gateway = test_gateway(&transport, signed_in(sample_user(1)));
        let (tx, _rx) = mpsc::channel(4);

        let mut chat = ChatSession::open(&gateway, 2, None, Duration::from_secs(5), tx).await;
        chat.close();
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert!(!chat.is_polling());
        assert_eq!(transport.request_count(), 2);
    }
}
