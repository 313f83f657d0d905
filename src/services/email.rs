//! Email channel backed by Resend.

use resend_rs::{ConfigBuilder, Resend};
use resend_rs::types::CreateEmailBaseOptions;

use super::form::ContactRequest;
use super::notify::{Channel, DispatchError, Notifier};
use crate::config::EmailConfig;

const EMAIL_SUBJECT: &str = "Message from Contactoo Support";

/// Plain-text body: the visitor's message followed by a short footer.
#[must_use]
pub fn render_email_text(request: &ContactRequest) -> String {
    format!("{}\n\n--\nSent from the Contactoo support portal.\n", request.body)
}

pub struct EmailNotifier {
    resend: Resend,
    from: String,
}

impl EmailNotifier {
    /// Send through `http`, so the portal's connect and request timeouts apply.
    #[must_use]
    pub fn new(http: reqwest::Client, config: &EmailConfig) -> Self {
        let mut builder = ConfigBuilder::new(config.api_key.as_str()).client(http);
        if let Some(base_url) = &config.base_url {
            builder = builder.base_url(base_url.clone());
        }
        Self { resend: Resend::with_config(builder.build()), from: config.from.clone() }
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn notify(&self, request: &ContactRequest) -> Result<(), DispatchError> {
        let to = [request.recipient.as_str()];
        let text = render_email_text(request);
        let email = CreateEmailBaseOptions::new(&self.from, to, EMAIL_SUBJECT).with_text(&text);
        self.resend
            .emails
            .send(email)
            .await
            .map_err(|e| DispatchError::EmailDelivery(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "email_test.rs"]
mod tests;
