//! Portal pages: the gated landing page and the contact overlay posts.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::auth::{LOGIN_PATH, resolve_session};
use crate::render::{VisitorPage, page_href, render_admin, render_visitor};
use crate::services::form::{DispatchForm, Submission};
use crate::services::gate::{View, VisitorView};
use crate::services::identity::{Role, Session};
use crate::services::notify::Channel;
use crate::state::AppState;

const CHAT_OPEN: &str = "open";

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    dialog: Option<String>,
    chat: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    recipient: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    chat: String,
}

fn visitor_html(session: &Session, view: &VisitorView, chat_open: bool, dialog: Option<(Channel, &DispatchForm)>) -> Html<String> {
    Html(render_visitor(&VisitorPage { username: &session.identity, view, chat_open, dialog }))
}

/// Run the gate for `session`, logging a failed history fetch.
async fn resolve_view(state: &AppState, session: &Session) -> View {
    let outcome = state.gate.resolve(session).await;
    if let Some(e) = &outcome.fetch_error {
        tracing::warn!(error = %e, identity = %session.identity, "chat history fetch failed; rendering empty chat");
    }
    outcome.view
}

/// `GET /`: resolve the session, run the gate, render the chosen view.
pub async fn index(State(state): State<AppState>, jar: CookieJar, Query(query): Query<PageQuery>) -> Response {
    let Some(session) = resolve_session(&state, &jar).await else {
        return Redirect::to(LOGIN_PATH).into_response();
    };

    match resolve_view(&state, &session).await {
        View::Admin => Html(render_admin(&session.identity)).into_response(),
        View::Visitor(view) => {
            let chat_open = query.chat.as_deref() == Some(CHAT_OPEN);
            let channel = query.dialog.as_deref().and_then(Channel::from_slug);
            let mut form = DispatchForm::new();
            if channel.is_some() {
                form.open();
            }
            visitor_html(&session, &view, chat_open, channel.map(|c| (c, &form))).into_response()
        }
    }
}

/// `POST /contact/{channel}`: submit an overlay form.
///
/// A complete form is handed off for delivery and the visitor is sent back to
/// the page with the overlay closed and the chat panel as it was. An
/// incomplete form re-renders with the overlay still open and values kept.
pub async fn contact(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(slug): Path<String>,
    Form(input): Form<ContactForm>,
) -> Response {
    let Some(channel) = Channel::from_slug(&slug) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Some(session) = resolve_session(&state, &jar).await else {
        return Redirect::to(LOGIN_PATH).into_response();
    };
    if session.role == Role::Operator {
        return Redirect::to("/").into_response();
    }

    let chat_open = input.chat == CHAT_OPEN;
    let mut form = DispatchForm::opened_with(input.recipient, input.body);
    match form.submit(state.notifiers.get(channel)) {
        // Delivery runs detached; its outcome is logged by the form.
        Submission::Sent(_) => Redirect::to(&page_href(None, chat_open)).into_response(),
        Submission::Skipped => {
            let view = match resolve_view(&state, &session).await {
                View::Visitor(view) => view,
                View::Admin => VisitorView::default(),
            };
            visitor_html(&session, &view, chat_open, Some((channel, &form))).into_response()
        }
    }
}

#[cfg(test)]
#[path = "portal_test.rs"]
mod tests;
