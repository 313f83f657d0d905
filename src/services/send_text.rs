//! SMS channel backed by the send-text relay.
//!
//! `GET {base}/send-text?recipient=..&textmessage=..`. The relay answers with
//! JSON whose content is not used; a non-JSON body still counts as a failure.

use reqwest::Url;

use super::form::ContactRequest;
use super::notify::{Channel, DispatchError, Notifier};

const SEND_TEXT_PATH: &str = "/send-text";

/// Build the relay URL with both values as query parameters.
pub fn send_text_url(base_url: &str, request: &ContactRequest) -> Result<Url, DispatchError> {
    let endpoint = format!("{}{SEND_TEXT_PATH}", base_url.trim_end_matches('/'));
    Url::parse_with_params(
        &endpoint,
        [("recipient", request.recipient.as_str()), ("textmessage", request.body.as_str())],
    )
    .map_err(|e| DispatchError::Url(format!("{endpoint}: {e}")))
}

pub struct SendTextClient {
    http: reqwest::Client,
    base_url: String,
}

impl SendTextClient {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into() }
    }
}

#[async_trait::async_trait]
impl Notifier for SendTextClient {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    async fn notify(&self, request: &ContactRequest) -> Result<(), DispatchError> {
        let url = send_text_url(&self.base_url, request)?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| DispatchError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| DispatchError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(DispatchError::Response { status, body: text });
        }

        // Payload is discarded; only its shape is checked.
        serde_json::from_str::<serde_json::Value>(&text).map_err(|e| DispatchError::Parse(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "send_text_test.rs"]
mod tests;
