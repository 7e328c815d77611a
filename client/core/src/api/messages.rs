//! Messaging calls

use crate::error::Result;
use crate::gateway::ApiGateway;
use crate::models::{Conversation, Message, OutgoingMessage, RecordId};
use crate::validation::normalize_message;

pub struct MessagesApi<'a> {
    gateway: &'a ApiGateway,
}

impl<'a> MessagesApi<'a> {
    pub fn new(gateway: &'a ApiGateway) -> Self {
        Self { gateway }
    }

    pub async fn conversations(&self) -> Result<Vec<Conversation>> {
        self.gateway
            .get("/api/messages/conversations")
            .await?
            .field_or_default("conversations")
    }

    /// Full thread with another user, oldest first
    pub async fn thread(&self, other_user_id: RecordId) -> Result<Vec<Message>> {
        self.gateway
            .get(format!("/api/messages/{other_user_id}"))
            .await?
            .field_or_default("messages")
    }

    /// Send a message; blank text is rejected locally.
    ///
    /// Returns the stored message when the service echoes it back.
    pub async fn send(
        &self,
        receiver_id: RecordId,
        text: &str,
        trip_id: Option<RecordId>,
    ) -> Result<Option<Message>> {
        let body = OutgoingMessage {
            receiver_id,
            message: normalize_message(text)?,
            trip_id,
        };
        let response = self.gateway.post("/api/messages", &body).await?;
        Ok(response.field::<Message>("message").ok())
    }
}
