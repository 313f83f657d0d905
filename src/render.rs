//! HTML page rendering.
//!
//! Pages are static templates with `{{KEY}}` placeholders, filled in a single
//! pass so substituted values are never re-scanned for placeholders. Every
//! value that originates from a user or an external service is escaped.

use std::fmt::Write;

use crate::services::chat::ChatMessage;
use crate::services::form::DispatchForm;
use crate::services::gate::VisitorView;
use crate::services::notify::Channel;

const VISITOR_TEMPLATE: &str = include_str!("../templates/visitor.html");
const DIALOG_TEMPLATE: &str = include_str!("../templates/dialog.html");
const ADMIN_TEMPLATE: &str = include_str!("../templates/admin.html");

/// Everything the visitor page depends on for one render.
pub struct VisitorPage<'a> {
    pub username: &'a str,
    pub view: &'a VisitorView,
    pub chat_open: bool,
    /// The overlay to show, if any, with its current form state.
    pub dialog: Option<(Channel, &'a DispatchForm)>,
}

#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Replace each `{{KEY}}` in `template` with its value. Unknown keys are kept.
#[must_use]
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push_str("{{");
                out.push_str(key);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

/// Link to the visitor page with the given overlay and chat panel state.
#[must_use]
pub fn page_href(dialog: Option<Channel>, chat_open: bool) -> String {
    match (dialog, chat_open) {
        (None, false) => "/".to_owned(),
        (None, true) => "/?chat=open".to_owned(),
        (Some(channel), false) => format!("/?dialog={}", channel.slug()),
        (Some(channel), true) => format!("/?dialog={}&chat=open", channel.slug()),
    }
}

fn render_messages(messages: &[ChatMessage]) -> String {
    if messages.is_empty() {
        return "<p>No messages yet.</p>".to_owned();
    }
    let mut html = String::from("<ul>");
    for message in messages {
        let _ = write!(
            html,
            "<li><strong>{}</strong> {}<time>{}</time></li>",
            escape_html(&message.sender),
            escape_html(&message.body),
            escape_html(&message.timestamp)
        );
    }
    html.push_str("</ul>");
    html
}

fn render_dialog(channel: Channel, form: &DispatchForm, chat_open: bool) -> String {
    let (recipient_label, body_label) = match channel {
        Channel::Sms => ("Recipient Number", "Text"),
        Channel::Email => ("Recipient Email", "Message"),
    };
    let close_href = page_href(None, chat_open);
    let recipient = escape_html(form.recipient());
    let body = escape_html(form.body());
    fill(
        DIALOG_TEMPLATE,
        &[
            ("CLOSE_HREF", close_href.as_str()),
            ("CHANNEL", channel.slug()),
            ("CHAT_VALUE", if chat_open { "open" } else { "" }),
            ("RECIPIENT_LABEL", recipient_label),
            ("RECIPIENT", recipient.as_str()),
            ("BODY_LABEL", body_label),
            ("BODY", body.as_str()),
        ],
    )
}

#[must_use]
pub fn render_visitor(page: &VisitorPage<'_>) -> String {
    let username = escape_html(page.username);
    let room_id = escape_html(page.view.room_id.as_deref().unwrap_or_default());
    let messages = render_messages(&page.view.messages);
    let dialog = page
        .dialog
        .filter(|(_, form)| form.is_open())
        .map(|(channel, form)| render_dialog(channel, form, page.chat_open))
        .unwrap_or_default();
    let sms_href = page_href(Some(Channel::Sms), page.chat_open);
    let email_href = page_href(Some(Channel::Email), page.chat_open);
    let toggle_href = page_href(None, !page.chat_open);

    fill(
        VISITOR_TEMPLATE,
        &[
            ("USERNAME", username.as_str()),
            ("SMS_HREF", sms_href.as_str()),
            ("EMAIL_HREF", email_href.as_str()),
            ("CHAT_TOGGLE_CLASS", if page.chat_open { "open" } else { "" }),
            ("CHAT_TOGGLE_HREF", toggle_href.as_str()),
            ("CHAT_CLASS", if page.chat_open { "" } else { "hidden" }),
            ("ROOM_ID", room_id.as_str()),
            ("CHAT_MESSAGES", messages.as_str()),
            ("DIALOG", dialog.as_str()),
        ],
    )
}

#[must_use]
pub fn render_admin(username: &str) -> String {
    fill(ADMIN_TEMPLATE, &[("USERNAME", escape_html(username).as_str())])
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
