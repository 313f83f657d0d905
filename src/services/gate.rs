//! Session gate: picks the top-level view for a resolved session.
//!
//! DESIGN
//! ======
//! Operators get the admin view with no data access. Visitors get the support
//! page, preloaded with chat history when the data API cooperates. A failed
//! fetch is never fatal: the visitor view renders with no messages and no
//! room, and the failure travels back in `GateOutcome::fetch_error` so callers
//! can observe it without changing what is rendered.

use std::sync::Arc;

use super::chat::{ChatApi, ChatApiError, ChatMessage, RoomInput};
use super::identity::{Role, Session};

/// Data the visitor page is rendered from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorView {
    pub messages: Vec<ChatMessage>,
    pub room_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Admin,
    Visitor(VisitorView),
}

#[derive(Debug)]
pub struct GateOutcome {
    pub view: View,
    /// Set when the visitor history fetch failed and defaults were used.
    pub fetch_error: Option<ChatApiError>,
}

/// Room and paging parameters for the visitor history fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSettings {
    pub room_id: String,
    pub message_limit: u32,
}

#[derive(Clone)]
pub struct SessionGate {
    chat: Arc<dyn ChatApi>,
    room: RoomSettings,
}

impl SessionGate {
    #[must_use]
    pub fn new(chat: Arc<dyn ChatApi>, room: RoomSettings) -> Self {
        Self { chat, room }
    }

    /// Decide which view renders for `session`.
    pub async fn resolve(&self, session: &Session) -> GateOutcome {
        match session.role {
            Role::Operator => GateOutcome { view: View::Admin, fetch_error: None },
            Role::Visitor => match self.fetch_history(&session.access_token).await {
                Ok(view) => GateOutcome { view: View::Visitor(view), fetch_error: None },
                Err(e) => GateOutcome { view: View::Visitor(VisitorView::default()), fetch_error: Some(e) },
            },
        }
    }

    async fn fetch_history(&self, access_token: &str) -> Result<VisitorView, ChatApiError> {
        let room = self
            .chat
            .create_room(access_token, &RoomInput::open(self.room.room_id.clone()))
            .await?;
        let page = self
            .chat
            .list_messages(access_token, &room.room_id, self.room.message_limit, "")
            .await?;
        tracing::debug!(room_id = %room.room_id, count = page.items.len(), "loaded chat history");
        Ok(VisitorView { messages: page.items, room_id: Some(room.room_id) })
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
