use super::*;
use crate::routes::app;
use crate::services::form::ContactRequest;
use crate::services::notify::Notifiers;
use crate::state::test_helpers::{self, MockChat, MockNotifier, OPERATOR_TOKEN, VISITOR_TOKEN};
use axum::body::Body;
use axum::http::{Request, header};
use std::sync::Arc;

fn get_page(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("contactoo_session={token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, token: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, format!("contactoo_session={token}"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_owned()))
        .unwrap()
}

struct Harness {
    chat: Arc<MockChat>,
    sms: Arc<MockNotifier>,
    state: AppState,
}

fn harness(chat: MockChat) -> Harness {
    let chat = Arc::new(chat);
    let sms = Arc::new(MockNotifier::ok(Channel::Sms));
    let state = test_helpers::test_app_state(chat.clone(), Notifiers::new().with(sms.clone()));
    Harness { chat, sms, state }
}

// =============================================================================
// GET /
// =============================================================================

#[tokio::test]
async fn index_without_session_redirects_to_login() {
    let h = harness(MockChat::ok(Vec::new()));
    let (status, headers, _) = test_helpers::call(app(h.state), get_page("/", None)).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], LOGIN_PATH);
}

#[tokio::test]
async fn index_with_rejected_token_redirects_to_login() {
    let h = harness(MockChat::ok(Vec::new()));
    let (status, _, _) = test_helpers::call(app(h.state), get_page("/", Some("expired"))).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn operator_sees_admin_page_without_fetch() {
    let h = harness(MockChat::ok(vec![test_helpers::message("alice", "hi")]));
    let (status, _, body) = test_helpers::call(app(h.state), get_page("/", Some(OPERATOR_TOKEN))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Contactoo Admin"));
    assert!(body.contains("Signed in as dana"));
    assert!(h.chat.calls().is_empty());
}

#[tokio::test]
async fn visitor_sees_history() {
    let h = harness(MockChat::ok(vec![test_helpers::message("support", "Welcome back")]));
    let (status, _, body) = test_helpers::call(app(h.state), get_page("/", Some(VISITOR_TOKEN))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Hello, alice"));
    assert!(body.contains("Welcome back"));
    assert!(body.contains(r#"data-room="room-1234""#));
    assert!(!body.contains("role=\"dialog\""));
}

#[tokio::test]
async fn visitor_page_survives_failed_fetch() {
    let h = harness(MockChat::failing());
    let (status, _, body) = test_helpers::call(app(h.state), get_page("/", Some(VISITOR_TOKEN))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Hello, alice"));
    assert!(body.contains("No messages yet."));
    assert!(body.contains(r#"data-room="""#));
}

#[tokio::test]
async fn dialog_query_opens_overlay() {
    let h = harness(MockChat::ok(Vec::new()));
    let (_, _, body) =
        test_helpers::call(app(h.state), get_page("/?dialog=email&chat=open", Some(VISITOR_TOKEN))).await;

    assert!(body.contains(r#"action="/contact/email""#));
    assert!(body.contains("Recipient Email"));
    assert!(body.contains(r#"class="chat ""#));
}

#[tokio::test]
async fn unknown_dialog_is_ignored() {
    let h = harness(MockChat::ok(Vec::new()));
    let (status, _, body) = test_helpers::call(app(h.state), get_page("/?dialog=fax", Some(VISITOR_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("role=\"dialog\""));
}

// =============================================================================
// POST /contact/{channel}
// =============================================================================

#[tokio::test]
async fn valid_contact_sends_once_and_redirects() {
    let h = harness(MockChat::ok(Vec::new()));
    let request = post_form("/contact/sms", VISITOR_TOKEN, "recipient=5551234567&body=Hello&chat=");

    let (status, headers, _) = test_helpers::call(app(h.state), request).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/");

    let sms = h.sms.clone();
    test_helpers::wait_until(move || !sms.sent().is_empty()).await;
    assert_eq!(
        h.sms.sent(),
        vec![ContactRequest { recipient: "5551234567".into(), body: "Hello".into() }]
    );
}

#[tokio::test]
async fn valid_contact_preserves_open_chat() {
    let h = harness(MockChat::ok(Vec::new()));
    let request = post_form("/contact/sms", VISITOR_TOKEN, "recipient=5551234567&body=Hello&chat=open");

    let (_, headers, _) = test_helpers::call(app(h.state), request).await;
    assert_eq!(headers[header::LOCATION], "/?chat=open");
}

#[tokio::test]
async fn incomplete_contact_keeps_overlay_open() {
    let h = harness(MockChat::ok(Vec::new()));
    let request = post_form("/contact/sms", VISITOR_TOKEN, "recipient=5551234567&body=");

    let (status, _, body) = test_helpers::call(app(h.state), request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("role=\"dialog\""));
    assert!(body.contains(r#"name="recipient" value="5551234567""#));

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(h.sms.sent().is_empty());
}

#[tokio::test]
async fn unconfigured_channel_still_redirects() {
    let h = harness(MockChat::ok(Vec::new()));
    let request = post_form("/contact/email", VISITOR_TOKEN, "recipient=a%40example.test&body=Hi");

    let (status, headers, _) = test_helpers::call(app(h.state), request).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/");
}

#[tokio::test]
async fn unknown_channel_is_not_found() {
    let h = harness(MockChat::ok(Vec::new()));
    let request = post_form("/contact/fax", VISITOR_TOKEN, "recipient=1&body=x");
    let (status, _, _) = test_helpers::call(app(h.state), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn operator_contact_post_is_bounced() {
    let h = harness(MockChat::ok(Vec::new()));
    let request = post_form("/contact/sms", OPERATOR_TOKEN, "recipient=5551234567&body=Hello");

    let (status, headers, _) = test_helpers::call(app(h.state), request).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/");
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(h.sms.sent().is_empty());
}
