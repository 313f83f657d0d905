//! Outbound contact channels.
//!
//! Each channel delivers one `ContactRequest` through an external service:
//! SMS goes to the send-text relay, email goes through Resend. Delivery is a
//! single attempt; failures are reported to the caller and never retried.

use std::collections::HashMap;
use std::sync::Arc;

use super::form::ContactRequest;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("{0} channel is not configured")]
    NotConfigured(Channel),
    #[error("invalid endpoint url: {0}")]
    Url(String),
    #[error("send request failed: {0}")]
    Request(String),
    #[error("send response error: status {status}")]
    Response { status: u16, body: String },
    #[error("send response was not json: {0}")]
    Parse(String),
    #[error("email delivery failed: {0}")]
    EmailDelivery(String),
    #[error("send task aborted: {0}")]
    Aborted(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Sms,
    Email,
}

impl Channel {
    /// Parse the path segment used by the contact routes.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "sms" => Some(Self::Sms),
            "email" => Some(Self::Email),
            _ => None,
        }
    }

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::Sms => "sms",
            Self::Email => "email",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    fn channel(&self) -> Channel;

    async fn notify(&self, request: &ContactRequest) -> Result<(), DispatchError>;
}

/// Channel stand-in used when a channel has no backing service configured.
pub struct Unconfigured(pub Channel);

#[async_trait::async_trait]
impl Notifier for Unconfigured {
    fn channel(&self) -> Channel {
        self.0
    }

    async fn notify(&self, _request: &ContactRequest) -> Result<(), DispatchError> {
        Err(DispatchError::NotConfigured(self.0))
    }
}

/// Notifier lookup by channel.
#[derive(Clone, Default)]
pub struct Notifiers {
    by_channel: HashMap<Channel, Arc<dyn Notifier>>,
}

impl Notifiers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.by_channel.insert(notifier.channel(), notifier);
        self
    }

    /// Notifier for `channel`, or an [`Unconfigured`] stand-in.
    #[must_use]
    pub fn get(&self, channel: Channel) -> Arc<dyn Notifier> {
        self.by_channel
            .get(&channel)
            .cloned()
            .unwrap_or_else(|| Arc::new(Unconfigured(channel)))
    }
}

#[cfg(test)]
#[path = "notify_test.rs"]
mod tests;
