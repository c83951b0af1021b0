use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::timeout::TimeoutLayer;

use crate::auth;
use crate::handlers;
use crate::realtime::{ws_handler, ChatServer};
use crate::store::{EventStore, MessageStore, UserStore};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub events: Arc<dyn EventStore>,
    pub messages: Arc<dyn MessageStore>,
    pub chat: ChatServer,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        events: Arc<dyn EventStore>,
        messages: Arc<dyn MessageStore>,
    ) -> Self {
        let chat = ChatServer::new(users.clone(), messages.clone());
        Self {
            users,
            events,
            messages,
            chat,
        }
    }
}

// ============================================================================
// Server Setup
// ============================================================================

pub fn build_app(state: AppState, request_timeout_seconds: u64) -> Router {
    let api_routes = Router::new()
        .route("/users", get(handlers::v1::list_users))
        .route("/users/profile", put(handlers::v1::update_profile))
        .route("/users/{id}", get(handlers::v1::get_user))
        .route(
            "/events",
            get(handlers::v1::list_events).post(handlers::v1::create_event),
        )
        .route(
            "/events/{id}",
            get(handlers::v1::get_event)
                .put(handlers::v1::update_event)
                .delete(handlers::v1::delete_event),
        )
        .route(
            "/events/{id}/rsvp",
            post(handlers::v1::join_event).delete(handlers::v1::leave_event),
        )
        .route("/messages", post(handlers::v1::send_message))
        .route(
            "/messages/conversations",
            get(handlers::v1::list_conversations),
        )
        .route("/messages/{user_id}", get(handlers::v1::get_messages))
        .route("/messages/{user_id}/read", put(handlers::v1::mark_read))
        .with_state(state.clone())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(request_timeout_seconds),
        ));

    let api_v1 = api_routes
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024)) // 2 MB
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    // The socket authenticates at the handshake, so it stays outside the
    // bearer middleware; a request timeout would kill long-lived connections.
    Router::new()
        .route("/livez", get(handlers::livez))
        .route("/readyz", get(handlers::readyz))
        .route("/version", get(handlers::version))
        .route("/ws", get(ws_handler))
        .with_state(state)
        .nest("/api/v1", api_v1)
}
