//! Chat history client for the managed GraphQL API.
//!
//! Thin HTTP wrapper around two operations: `createRoom` and `listMessages`.
//! Requests are authorized with the visitor's user-pool access token. Response
//! envelopes are parsed by pure helpers so they can be tested without a server.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const CREATE_ROOM_MUTATION: &str = r"mutation CreateRoom($input: CreateRoomInput!) {
  createRoom(input: $input) {
    id
    roomId
    session
  }
}";

pub const LIST_MESSAGES_QUERY: &str = r"query ListMessages($roomId: ID!, $limit: Int, $nextToken: String) {
  listMessages(roomId: $roomId, limit: $limit, nextToken: $nextToken) {
    items {
      roomId
      sender
      body
      createdAt
    }
    nextToken
  }
}";

#[derive(Debug, thiserror::Error)]
pub enum ChatApiError {
    #[error("graphql request failed: {0}")]
    Request(String),
    #[error("graphql response error: status {status}")]
    Response { status: u16, body: String },
    #[error("graphql errors: {0}")]
    Graphql(String),
    #[error("graphql response parse failed: {0}")]
    Parse(String),
}

/// A stored chat message. Never constructed locally outside tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub room_id: String,
    pub sender: String,
    pub body: String,
    #[serde(rename = "createdAt", alias = "timestamp")]
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomInput {
    pub id: String,
    pub session: String,
}

impl RoomInput {
    /// An open support room with the given id.
    #[must_use]
    pub fn open(id: impl Into<String>) -> Self {
        Self { id: id.into(), session: "open".into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(default)]
    pub id: Option<String>,
    pub room_id: String,
    #[serde(default)]
    pub session: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    #[serde(default)]
    pub items: Vec<ChatMessage>,
    #[serde(default)]
    pub next_token: Option<String>,
}

/// External data API used by the session gate.
#[async_trait::async_trait]
pub trait ChatApi: Send + Sync {
    async fn create_room(&self, access_token: &str, input: &RoomInput) -> Result<Room, ChatApiError>;

    async fn list_messages(
        &self,
        access_token: &str,
        room_id: &str,
        limit: u32,
        next_token: &str,
    ) -> Result<MessagePage, ChatApiError>;
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

#[derive(Debug, Deserialize)]
struct GraphqlEnvelope {
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    #[serde(default)]
    message: String,
}

/// Pull `data.<field>` out of a GraphQL response body.
pub(crate) fn parse_field<T: DeserializeOwned>(body: &str, field: &str) -> Result<T, ChatApiError> {
    let envelope: GraphqlEnvelope = serde_json::from_str(body).map_err(|e| ChatApiError::Parse(e.to_string()))?;
    if !envelope.errors.is_empty() {
        let joined = envelope
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ChatApiError::Graphql(joined));
    }
    let value = envelope
        .data
        .and_then(|mut data| data.get_mut(field).map(serde_json::Value::take))
        .filter(|v| !v.is_null())
        .ok_or_else(|| ChatApiError::Parse(format!("missing data.{field}")))?;
    serde_json::from_value(value).map_err(|e| ChatApiError::Parse(e.to_string()))
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct GraphqlChatApi {
    http: reqwest::Client,
    endpoint: String,
}

impl GraphqlChatApi {
    #[must_use]
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self { http, endpoint: endpoint.into() }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        access_token: &str,
        query: &str,
        variables: serde_json::Value,
        field: &str,
    ) -> Result<T, ChatApiError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", access_token)
            .json(&serde_json::json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| ChatApiError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ChatApiError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(ChatApiError::Response { status, body: text });
        }

        parse_field(&text, field)
    }
}

#[async_trait::async_trait]
impl ChatApi for GraphqlChatApi {
    async fn create_room(&self, access_token: &str, input: &RoomInput) -> Result<Room, ChatApiError> {
        self.execute(access_token, CREATE_ROOM_MUTATION, serde_json::json!({ "input": input }), "createRoom")
            .await
    }

    async fn list_messages(
        &self,
        access_token: &str,
        room_id: &str,
        limit: u32,
        next_token: &str,
    ) -> Result<MessagePage, ChatApiError> {
        let variables = serde_json::json!({
            "roomId": room_id,
            "limit": limit,
            "nextToken": next_token,
        });
        self.execute(access_token, LIST_MESSAGES_QUERY, variables, "listMessages")
            .await
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
