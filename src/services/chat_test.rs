use super::*;
use crate::state::test_helpers;
use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use serde_json::{Value, json};

// =============================================================================
// parse_field
// =============================================================================

#[test]
fn parse_field_extracts_room() {
    let body = r#"{"data":{"createRoom":{"id":"1234","roomId":"room-9","session":"open"}}}"#;
    let room: Room = parse_field(body, "createRoom").unwrap();
    assert_eq!(room.room_id, "room-9");
    assert_eq!(room.session.as_deref(), Some("open"));
}

#[test]
fn parse_field_extracts_message_page() {
    let body = r#"{"data":{"listMessages":{"items":[
        {"roomId":"room-9","sender":"alice","body":"hi","createdAt":"2022-05-01T10:00:00Z"}
    ],"nextToken":null}}}"#;
    let page: MessagePage = parse_field(body, "listMessages").unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].sender, "alice");
    assert_eq!(page.items[0].timestamp, "2022-05-01T10:00:00Z");
    assert!(page.next_token.is_none());
}

#[test]
fn parse_field_surfaces_graphql_errors() {
    let body = r#"{"data":null,"errors":[{"message":"Unauthorized"},{"message":"Not Authorized to access createRoom"}]}"#;
    let err = parse_field::<Room>(body, "createRoom").unwrap_err();
    assert!(matches!(err, ChatApiError::Graphql(ref m) if m.contains("Unauthorized") && m.contains("; ")));
}

#[test]
fn parse_field_missing_field_is_parse_error() {
    let err = parse_field::<Room>(r#"{"data":{"createRoom":null}}"#, "createRoom").unwrap_err();
    assert!(matches!(err, ChatApiError::Parse(ref m) if m.contains("createRoom")));
}

#[test]
fn parse_field_rejects_non_json() {
    let err = parse_field::<Room>("<html>bad gateway</html>", "createRoom").unwrap_err();
    assert!(matches!(err, ChatApiError::Parse(_)));
}

#[test]
fn room_input_open_uses_open_session() {
    let input = RoomInput::open("1234");
    assert_eq!(serde_json::to_value(&input).unwrap(), json!({ "id": "1234", "session": "open" }));
}

// =============================================================================
// GraphqlChatApi against a stub endpoint
// =============================================================================

async fn stub_graphql(headers: HeaderMap, body: String) -> (StatusCode, String) {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "visitor-token");
    if !authorized {
        return (StatusCode::UNAUTHORIZED, r#"{"errors":[{"message":"Unauthorized"}]}"#.into());
    }

    let request: Value = serde_json::from_str(&body).unwrap_or_default();
    let query = request["query"].as_str().unwrap_or_default();
    let response = if query.contains("createRoom") {
        assert_eq!(request["variables"]["input"]["session"], "open");
        json!({ "data": { "createRoom": { "id": request["variables"]["input"]["id"], "roomId": "room-1234" } } })
    } else {
        assert_eq!(request["variables"]["limit"], 10);
        assert_eq!(request["variables"]["nextToken"], "");
        json!({ "data": { "listMessages": { "items": [{
            "roomId": request["variables"]["roomId"],
            "sender": "support",
            "body": "How can we help?",
            "createdAt": "2022-05-01T10:00:00Z"
        }], "nextToken": null } } })
    };
    (StatusCode::OK, response.to_string())
}

#[tokio::test]
async fn client_creates_room_and_lists_messages() {
    let base = test_helpers::spawn_stub(Router::new().route("/graphql", post(stub_graphql))).await;
    let api = GraphqlChatApi::new(reqwest::Client::new(), format!("{base}/graphql"));

    let room = api
        .create_room("visitor-token", &RoomInput::open("1234"))
        .await
        .unwrap();
    assert_eq!(room.room_id, "room-1234");
    assert_eq!(room.id.as_deref(), Some("1234"));

    let page = api
        .list_messages("visitor-token", &room.room_id, 10, "")
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].room_id, "room-1234");
}

#[tokio::test]
async fn client_reports_unauthorized_status() {
    let base = test_helpers::spawn_stub(Router::new().route("/graphql", post(stub_graphql))).await;
    let api = GraphqlChatApi::new(reqwest::Client::new(), format!("{base}/graphql"));

    let err = api
        .create_room("wrong-token", &RoomInput::open("1234"))
        .await
        .unwrap_err();
    assert!(matches!(err, ChatApiError::Response { status: 401, .. }));
}
