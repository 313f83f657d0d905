//! JSON contact endpoint.
//!
//! Same dispatch flow as the overlay form, but the caller waits for delivery
//! and gets the outcome back instead of a redirect.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use super::auth::AuthSession;
use crate::services::form::{DispatchForm, Submission};
use crate::services::identity::Role;
use crate::services::notify::Channel;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ContactPayload {
    #[serde(default)]
    recipient: String,
    #[serde(default)]
    body: String,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ContactStatus {
    Skipped,
    Sent,
    Failed { error: String },
}

/// `POST /api/contact/{channel}`: send and report `skipped`, `sent` or `failed`.
///
/// Visitors only; operators get 403, matching the overlay form route.
pub async fn contact(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(slug): Path<String>,
    Json(payload): Json<ContactPayload>,
) -> Result<(StatusCode, Json<ContactStatus>), StatusCode> {
    let channel = Channel::from_slug(&slug).ok_or(StatusCode::NOT_FOUND)?;
    if session.role == Role::Operator {
        return Err(StatusCode::FORBIDDEN);
    }

    let mut form = DispatchForm::opened_with(payload.recipient, payload.body);
    let status = match form.submit(state.notifiers.get(channel)) {
        Submission::Skipped => (StatusCode::OK, ContactStatus::Skipped),
        Submission::Sent(handle) => {
            let channel = handle.channel;
            match handle.outcome().await {
                Ok(()) => (StatusCode::OK, ContactStatus::Sent),
                Err(e) => {
                    tracing::warn!(%channel, identity = %session.identity, error = %e, "api contact send failed");
                    (StatusCode::BAD_GATEWAY, ContactStatus::Failed { error: e.to_string() })
                }
            }
        }
    };
    Ok((status.0, Json(status.1)))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
