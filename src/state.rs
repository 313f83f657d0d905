//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the external collaborators behind trait objects (identity provider,
//! chat data API via the session gate, one notifier per contact channel) plus
//! the optional Hosted UI settings. No per-visitor state lives here: each
//! request builds and owns its own form state.

use std::sync::Arc;

use crate::config::{HostedUiConfig, PortalConfig};
use crate::services::chat::GraphqlChatApi;
use crate::services::email::EmailNotifier;
use crate::services::gate::{RoomSettings, SessionGate};
use crate::services::identity::{CognitoIdentityProvider, IdentityProvider};
use crate::services::notify::Notifiers;
use crate::services::send_text::SendTextClient;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub gate: SessionGate,
    pub notifiers: Notifiers,
    /// Hosted UI sign-in. `None` if the `COGNITO_*` client settings are missing.
    pub hosted_ui: Option<HostedUiConfig>,
    /// Client used for the OAuth token exchange.
    pub http: reqwest::Client,
}

impl AppState {
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        gate: SessionGate,
        notifiers: Notifiers,
        hosted_ui: Option<HostedUiConfig>,
        http: reqwest::Client,
    ) -> Self {
        Self { identity, gate, notifiers, hosted_ui, http }
    }

    /// Wire the production collaborators described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &PortalConfig) -> Result<Self, reqwest::Error> {
        let http = config.timeouts.client()?;

        let identity = CognitoIdentityProvider::new(
            http.clone(),
            CognitoIdentityProvider::endpoint_for_region(&config.cognito_region),
            config.role_attribute.clone(),
        );
        let chat = GraphqlChatApi::new(http.clone(), config.graphql_url.clone());
        let gate = SessionGate::new(
            Arc::new(chat),
            RoomSettings { room_id: config.chat_room_id.clone(), message_limit: config.chat_message_limit },
        );

        let mut notifiers = Notifiers::new().with(Arc::new(SendTextClient::new(http.clone(), config.send_text_url.clone())));
        match &config.email {
            Some(email) => notifiers = notifiers.with(Arc::new(EmailNotifier::new(http.clone(), email))),
            None => tracing::warn!("RESEND_API_KEY/RESEND_FROM not set, email channel disabled"),
        }

        Ok(Self::new(Arc::new(identity), gate, notifiers, config.hosted_ui.clone(), http))
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
