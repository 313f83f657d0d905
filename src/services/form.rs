//! Dispatch form: state behind the SMS and Email overlays.
//!
//! DESIGN
//! ======
//! `Closed --open--> Open --submit[valid]--> Closed` with the request handed to
//! a notifier on a detached task. An invalid submit leaves the form untouched.
//! Closing or submitting resets only this form's fields; nothing else on the
//! page is reset.

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::notify::{Channel, DispatchError, Notifier};

/// One outbound message, alive only between submit and delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRequest {
    pub recipient: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchForm {
    recipient: String,
    body: String,
    is_open: bool,
}

/// Result of [`DispatchForm::submit`].
#[derive(Debug)]
pub enum Submission {
    /// A field was empty or the form was closed; nothing was sent.
    Skipped,
    /// The request was handed off to a notifier.
    Sent(SendHandle),
}

/// Handle on an in-flight send. Dropping it leaves the send running.
#[derive(Debug)]
pub struct SendHandle {
    pub channel: Channel,
    task: JoinHandle<Result<(), DispatchError>>,
}

impl SendHandle {
    /// Wait for delivery and report how it went.
    pub async fn outcome(self) -> Result<(), DispatchError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(DispatchError::Aborted(e.to_string())),
        }
    }
}

impl DispatchForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An open form pre-filled with previously posted values.
    #[must_use]
    pub fn opened_with(recipient: impl Into<String>, body: impl Into<String>) -> Self {
        let mut form = Self::new();
        form.open();
        form.set_recipient(recipient);
        form.set_body(body);
        form
    }

    pub fn open(&mut self) {
        self.is_open = true;
    }

    /// Dismiss the overlay and drop whatever was typed.
    pub fn close(&mut self) {
        self.is_open = false;
        self.recipient.clear();
        self.body.clear();
    }

    pub fn set_recipient(&mut self, value: impl Into<String>) {
        self.recipient = value.into();
    }

    pub fn set_body(&mut self, value: impl Into<String>) {
        self.body = value.into();
    }

    #[must_use]
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.recipient.is_empty() && !self.body.is_empty()
    }

    /// Send the form through `notifier` if both fields are filled in.
    ///
    /// On success the form closes and its fields reset immediately; delivery
    /// continues on a spawned task whose failure is logged. Must be called from
    /// within a Tokio runtime.
    pub fn submit(&mut self, notifier: Arc<dyn Notifier>) -> Submission {
        if !self.is_open || !self.is_complete() {
            return Submission::Skipped;
        }

        let request = ContactRequest { recipient: self.recipient.clone(), body: self.body.clone() };
        self.close();

        let channel = notifier.channel();
        let task = tokio::spawn(async move {
            let result = notifier.notify(&request).await;
            match &result {
                Ok(()) => tracing::info!(%channel, "contact request sent"),
                Err(e) => tracing::warn!(%channel, error = %e, "contact request failed"),
            }
            result
        });

        Submission::Sent(SendHandle { channel, task })
    }
}

#[cfg(test)]
#[path = "form_test.rs"]
mod tests;
