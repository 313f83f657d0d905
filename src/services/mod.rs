//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the contact flow and every call to an external
//! collaborator (identity provider, chat data API, send-text relay, email) so
//! route handlers can stay focused on request translation and cookies.

pub mod chat;
pub mod email;
pub mod form;
pub mod gate;
pub mod identity;
pub mod notify;
pub mod oauth;
pub mod send_text;
