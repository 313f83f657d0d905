//! Auth routes: Cognito Hosted UI flow and session cookie handling.

use axum::extract::{FromRef, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

use crate::config::env_bool;
use crate::services::identity::Session;
use crate::services::oauth;
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "contactoo_session";
const OAUTH_STATE_COOKIE_NAME: &str = "oauth_state";
pub(crate) const LOGIN_PATH: &str = "/auth/login";

pub(crate) fn cookie_secure() -> bool {
    if let Some(value) = env_bool("COOKIE_SECURE") {
        return value;
    }

    std::env::var("COGNITO_REDIRECT_URI")
        .map(|uri| uri.starts_with("https://"))
        .unwrap_or(false)
}

fn base_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn expired_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    let mut cookie = base_cookie(name, String::new(), secure);
    cookie.set_max_age(Duration::ZERO);
    cookie
}

/// Resolve the session behind the request's cookie. `None` means "not signed in".
pub(crate) async fn resolve_session(state: &AppState, jar: &CookieJar) -> Option<Session> {
    let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
    if token.is_empty() {
        return None;
    }

    match state.identity.current_authenticated_user(token).await {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::info!(error = %e, "session cookie rejected");
            None
        }
    }
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated session extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthSession(pub Session);

impl<S> axum::extract::FromRequestParts<S> for AuthSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let app_state = AppState::from_ref(state);
        resolve_session(&app_state, &jar)
            .await
            .map(Self)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /auth/login`: redirect to the Hosted UI sign-in page.
pub async fn login(State(state): State<AppState>) -> Response {
    let Some(config) = &state.hosted_ui else {
        return (StatusCode::SERVICE_UNAVAILABLE, "Sign-in not configured").into_response();
    };

    let oauth_state = oauth::generate_state();
    let authorize_url = match config.authorize_url(&oauth_state) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(error = %e, "cannot build hosted ui authorize url");
            return (StatusCode::SERVICE_UNAVAILABLE, "Sign-in not configured").into_response();
        }
    };
    let mut cookie = base_cookie(OAUTH_STATE_COOKIE_NAME, oauth_state.clone(), cookie_secure());
    cookie.set_max_age(Duration::minutes(10));

    let jar = CookieJar::new().add(cookie);
    (jar, Redirect::temporary(authorize_url.as_str())).into_response()
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: String,
    state: Option<String>,
}

/// `GET /auth/callback`: verify state, exchange code, set session cookie, redirect to `/`.
pub async fn callback(State(state): State<AppState>, jar: CookieJar, Query(params): Query<CallbackQuery>) -> Response {
    let Some(config) = &state.hosted_ui else {
        return (StatusCode::SERVICE_UNAVAILABLE, "Sign-in not configured").into_response();
    };
    let secure = cookie_secure();

    // Verify OAuth CSRF state from cookie.
    let Some(callback_state) = params.state.as_deref() else {
        return (StatusCode::BAD_REQUEST, "missing oauth state").into_response();
    };
    let expected_state = jar
        .get(OAUTH_STATE_COOKIE_NAME)
        .map(Cookie::value)
        .unwrap_or_default();
    if expected_state.is_empty() || expected_state != callback_state {
        return (StatusCode::UNAUTHORIZED, "invalid oauth state").into_response();
    }

    let tokens = match oauth::exchange_code(&state.http, config, &params.code).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "oauth code exchange failed");
            return (StatusCode::BAD_GATEWAY, "Sign-in code exchange failed").into_response();
        }
    };

    let mut session_cookie = base_cookie(COOKIE_NAME, tokens.access_token, secure);
    if let Some(secs) = tokens.expires_in {
        session_cookie.set_max_age(Duration::seconds(secs));
    }

    let jar = jar
        .add(session_cookie)
        .add(expired_cookie(OAUTH_STATE_COOKIE_NAME, secure));
    (jar, Redirect::to("/")).into_response()
}

/// `POST /auth/logout`: clear the session cookie and return to sign-in.
pub async fn logout() -> impl IntoResponse {
    let jar = CookieJar::new().add(expired_cookie(COOKIE_NAME, cookie_secure()));
    (jar, Redirect::to(LOGIN_PATH))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
