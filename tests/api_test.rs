//! Integration tests for the HTTP API.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

mod common;

use common::{seed_user, test_app, test_app_state};
use foundernet::server;

// ============================================================================
// Health Endpoints
// ============================================================================

#[tokio::test]
async fn test_livez() {
    let app = test_app().await;

    let response = app
        .oneshot(Request::get("/livez").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn test_readyz_reports_online_users() {
    let app = test_app().await;

    let response = app
        .oneshot(Request::get("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["online_users"], 0);
}

#[tokio::test]
async fn test_version() {
    let app = test_app().await;

    let response = app
        .oneshot(Request::get("/version").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert!(json.get("version").is_some());
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_api_requires_bearer_token() {
    let app = test_app().await;

    let response = app
        .oneshot(Request::get("/api/v1/users").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], 401);
}

#[tokio::test]
async fn test_unknown_token_is_rejected() {
    let state = test_app_state().await;
    seed_user(&state, "Ada", "tok_real").await;
    let app = server::build_app(state, 300);

    let response = app
        .oneshot(
            Request::get("/api/v1/users")
                .header("authorization", "Bearer tok_wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// WebSocket Handshake
// ============================================================================

fn ws_handshake_request(uri: &str) -> Request<Body> {
    let mut request = Request::get(uri)
        .header("connection", "upgrade")
        .header("upgrade", "websocket")
        .header("sec-websocket-version", "13")
        .header("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ==")
        .body(Body::empty())
        .unwrap();
    // `oneshot` skips hyper, so the upgrade extension a real HTTP/1.1
    // connection carries must be supplied for the handshake extractor.
    let on_upgrade = hyper::upgrade::on(&mut request);
    request.extensions_mut().insert(on_upgrade);
    request
}

#[tokio::test]
async fn test_ws_handshake_refused_without_token() {
    let state = test_app_state().await;
    seed_user(&state, "Ada", "tok_ada").await;
    let app = server::build_app(state, 300);

    let response = app.oneshot(ws_handshake_request("/ws")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], 401);
}

#[tokio::test]
async fn test_ws_handshake_refused_with_unknown_token() {
    let state = test_app_state().await;
    seed_user(&state, "Ada", "tok_ada").await;
    let app = server::build_app(state, 300);

    let response = app
        .oneshot(ws_handshake_request("/ws?token=tok_wrong"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ws_handshake_upgrades_with_valid_token() {
    let state = test_app_state().await;
    seed_user(&state, "Ada", "tok_ada").await;
    let app = server::build_app(state, 300);

    let response = app
        .oneshot(ws_handshake_request("/ws?token=tok_ada"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SWITCHING_PROTOCOLS);
}

// ============================================================================
// Users API
// ============================================================================

#[tokio::test]
async fn test_list_users_excludes_caller() {
    let state = test_app_state().await;
    let ada = seed_user(&state, "Ada", "tok_ada").await;
    let grace = seed_user(&state, "Grace", "tok_grace").await;
    let app = server::build_app(state, 300);

    let response = app
        .oneshot(
            Request::get("/api/v1/users")
                .header("authorization", "Bearer tok_ada")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let users = json["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"], grace.id.as_str());
    assert_ne!(users[0]["id"], ada.id.as_str());
    // Credentials never leak into API views.
    assert!(users[0].get("credential").is_none());
    assert_eq!(json["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_get_user_not_found() {
    let state = test_app_state().await;
    seed_user(&state, "Ada", "tok_ada").await;
    let app = server::build_app(state, 300);

    let response = app
        .oneshot(
            Request::get("/api/v1/users/user_missing")
                .header("authorization", "Bearer tok_ada")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_profile_rejects_short_bio() {
    let state = test_app_state().await;
    seed_user(&state, "Ada", "tok_ada").await;
    let app = server::build_app(state, 300);

    let body = serde_json::json!({
        "name": "Ada",
        "startup_name": "Ada Labs",
        "industry": "SaaS",
        "funding_stage": "Seed",
        "location": "SF",
        "bio": "too short"
    });

    let response = app
        .oneshot(
            Request::put("/api/v1/users/profile")
                .header("authorization", "Bearer tok_ada")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Events API
// ============================================================================

fn create_event_body() -> serde_json::Value {
    let date = chrono::Utc::now() + chrono::Duration::days(7);
    serde_json::json!({
        "title": "Founders Mixer",
        "description": "Casual networking for early-stage founders.",
        "date": date.to_rfc3339(),
        "time": "18:30",
        "location": "SoMa, San Francisco",
        "max_attendees": 2,
        "tags": ["Networking"]
    })
}

#[tokio::test]
async fn test_event_create_and_rsvp_flow() {
    let state = test_app_state().await;
    seed_user(&state, "Ada", "tok_ada").await;
    let grace = seed_user(&state, "Grace", "tok_grace").await;
    let app = server::build_app(state, 300);

    // Ada creates the event.
    let response = app
        .clone()
        .oneshot(
            Request::post("/api/v1/events")
                .header("authorization", "Bearer tok_ada")
                .header("content-type", "application/json")
                .body(Body::from(create_event_body().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let event: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let event_id = event["id"].as_str().unwrap().to_string();
    assert_eq!(event["organizer"]["name"], "Ada");
    assert_eq!(event["attendees"].as_array().unwrap().len(), 0);

    // Grace RSVPs.
    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/api/v1/events/{event_id}/rsvp"))
                .header("authorization", "Bearer tok_grace")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let event: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let attendees = event["attendees"].as_array().unwrap();
    assert_eq!(attendees.len(), 1);
    assert_eq!(attendees[0]["id"], grace.id.as_str());

    // A second RSVP from the same user is rejected.
    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/api/v1/events/{event_id}/rsvp"))
                .header("authorization", "Bearer tok_grace")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Leaving works once, then is rejected.
    let response = app
        .clone()
        .oneshot(
            Request::delete(format!("/api/v1/events/{event_id}/rsvp"))
                .header("authorization", "Bearer tok_grace")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::delete(format!("/api/v1/events/{event_id}/rsvp"))
                .header("authorization", "Bearer tok_grace")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rsvp_rejects_organizer_and_full_event() {
    let state = test_app_state().await;
    seed_user(&state, "Ada", "tok_ada").await;
    seed_user(&state, "Grace", "tok_grace").await;
    seed_user(&state, "Emily", "tok_emily").await;
    seed_user(&state, "Lin", "tok_lin").await;
    let app = server::build_app(state, 300);

    // Ada creates an event with room for two.
    let response = app
        .clone()
        .oneshot(
            Request::post("/api/v1/events")
                .header("authorization", "Bearer tok_ada")
                .header("content-type", "application/json")
                .body(Body::from(create_event_body().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let event: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let event_id = event["id"].as_str().unwrap().to_string();

    // The organizer cannot RSVP to their own event.
    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/api/v1/events/{event_id}/rsvp"))
                .header("authorization", "Bearer tok_ada")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Grace and Emily fill the event.
    for token in ["tok_grace", "tok_emily"] {
        let response = app
            .clone()
            .oneshot(
                Request::post(format!("/api/v1/events/{event_id}/rsvp"))
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Lin bounces off the capacity limit.
    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/api/v1/events/{event_id}/rsvp"))
                .header("authorization", "Bearer tok_lin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["detail"].as_str().unwrap().contains("full"));

    // A seat freeing up lets Lin in.
    let response = app
        .clone()
        .oneshot(
            Request::delete(format!("/api/v1/events/{event_id}/rsvp"))
                .header("authorization", "Bearer tok_grace")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::post(format!("/api/v1/events/{event_id}/rsvp"))
                .header("authorization", "Bearer tok_lin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_event_update_is_organizer_only() {
    let state = test_app_state().await;
    seed_user(&state, "Ada", "tok_ada").await;
    seed_user(&state, "Grace", "tok_grace").await;
    let app = server::build_app(state, 300);

    let response = app
        .clone()
        .oneshot(
            Request::post("/api/v1/events")
                .header("authorization", "Bearer tok_ada")
                .header("content-type", "application/json")
                .body(Body::from(create_event_body().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let event: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let event_id = event["id"].as_str().unwrap().to_string();

    let update = serde_json::json!({ "title": "Renamed Mixer" });
    let response = app
        .clone()
        .oneshot(
            Request::put(format!("/api/v1/events/{event_id}"))
                .header("authorization", "Bearer tok_grace")
                .header("content-type", "application/json")
                .body(Body::from(update.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(
            Request::put(format!("/api/v1/events/{event_id}"))
                .header("authorization", "Bearer tok_ada")
                .header("content-type", "application/json")
                .body(Body::from(update.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let event: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(event["title"], "Renamed Mixer");
}

#[tokio::test]
async fn test_deleted_event_disappears_from_listing() {
    let state = test_app_state().await;
    seed_user(&state, "Ada", "tok_ada").await;
    let app = server::build_app(state, 300);

    let response = app
        .clone()
        .oneshot(
            Request::post("/api/v1/events")
                .header("authorization", "Bearer tok_ada")
                .header("content-type", "application/json")
                .body(Body::from(create_event_body().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let event: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let event_id = event["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::delete(format!("/api/v1/events/{event_id}"))
                .header("authorization", "Bearer tok_ada")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(
            Request::get("/api/v1/events")
                .header("authorization", "Bearer tok_ada")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["events"].as_array().unwrap().len(), 0);
}

// ============================================================================
// Messages API
// ============================================================================

#[tokio::test]
async fn test_message_send_history_and_mark_read() {
    let state = test_app_state().await;
    let ada = seed_user(&state, "Ada", "tok_ada").await;
    let grace = seed_user(&state, "Grace", "tok_grace").await;
    let app = server::build_app(state, 300);

    // Ada sends Grace a message.
    let body = serde_json::json!({
        "receiver_id": grace.id,
        "content": "Hey Grace, coffee next week?"
    });
    let response = app
        .clone()
        .oneshot(
            Request::post("/api/v1/messages")
                .header("authorization", "Bearer tok_ada")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let message: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(message["sender"]["id"], ada.id.as_str());
    assert_eq!(message["read"], false);

    // Grace sees one conversation with one unread message.
    let response = app
        .clone()
        .oneshot(
            Request::get("/api/v1/messages/conversations")
                .header("authorization", "Bearer tok_grace")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let conversations = json["conversations"].as_array().unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0]["user"]["id"], ada.id.as_str());
    assert_eq!(conversations[0]["unread_count"], 1);

    // Fetching the thread returns the message and marks it read.
    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/api/v1/messages/{}", ada.id))
                .header("authorization", "Bearer tok_grace")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let messages = json["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], "Hey Grace, coffee next week?");

    // Explicit mark-read now has nothing left to update.
    let response = app
        .clone()
        .oneshot(
            Request::put(format!("/api/v1/messages/{}/read", ada.id))
                .header("authorization", "Bearer tok_grace")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["updated"], 0);

    // And the unread count is gone.
    let response = app
        .oneshot(
            Request::get("/api/v1/messages/conversations")
                .header("authorization", "Bearer tok_grace")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["conversations"][0]["unread_count"], 0);
}

#[tokio::test]
async fn test_send_message_rejects_blank_content() {
    let state = test_app_state().await;
    seed_user(&state, "Ada", "tok_ada").await;
    let grace = seed_user(&state, "Grace", "tok_grace").await;
    let app = server::build_app(state, 300);

    let body = serde_json::json!({ "receiver_id": grace.id, "content": "   " });
    let response = app
        .oneshot(
            Request::post("/api/v1/messages")
                .header("authorization", "Bearer tok_ada")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_send_message_to_unknown_receiver() {
    let state = test_app_state().await;
    seed_user(&state, "Ada", "tok_ada").await;
    let app = server::build_app(state, 300);

    let body = serde_json::json!({ "receiver_id": "user_missing", "content": "hello" });
    let response = app
        .oneshot(
            Request::post("/api/v1/messages")
                .header("authorization", "Bearer tok_ada")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
