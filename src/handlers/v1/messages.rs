//! Direct-message HTTP handlers.
//!
//! These cover history and conversation rollups; live delivery happens over
//! the realtime socket. Sending through REST persists the message without
//! socket fan-out.

use axum::extract::{Path as PathExtract, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::{
    ConversationView, GetMessagesResponse, ListConversationsResponse, MarkReadResponse,
    MessageView, PeerSummary, SendMessageRequest, UserSummary,
};
use crate::auth::CurrentUser;
use crate::handlers::problem_details;
use crate::server::AppState;
use crate::store::{MessageStore, UserStore, MAX_MESSAGE_LEN};

use super::storage_error;

// ============================================================================
// Query Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GetMessagesQuery {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    limit: Option<u32>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/messages/conversations
///
/// The caller's conversation rollups, most recent activity first.
pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
) -> Response {
    let entries = match state.messages.conversations_for(&me.id).await {
        Ok(entries) => entries,
        Err(e) => return storage_error(e),
    };

    let me_summary = UserSummary::from(&me);
    let mut conversations = Vec::with_capacity(entries.len());
    for entry in entries {
        let peer = match state.users.get(&entry.peer_id).await {
            Ok(Some(peer)) => peer,
            // Conversations with deleted accounts drop out of the list.
            Ok(None) => continue,
            Err(e) => return storage_error(e),
        };
        let peer_summary = UserSummary::from(&peer);
        let (sender, receiver) = if entry.last_message.sender == me.id {
            (me_summary.clone(), peer_summary)
        } else {
            (peer_summary, me_summary.clone())
        };
        conversations.push(ConversationView {
            user: PeerSummary::from(&peer),
            last_message: MessageView::new(entry.last_message, sender, receiver),
            unread_count: entry.unread_count,
        });
    }

    (
        StatusCode::OK,
        Json(ListConversationsResponse { conversations }),
    )
        .into_response()
}

/// GET /api/v1/messages/{user_id}
///
/// One page of the conversation with a peer, oldest first within the page.
/// Fetching a page marks the peer's messages to the caller as read.
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    PathExtract(user_id): PathExtract<String>,
    Query(query): Query<GetMessagesQuery>,
) -> Response {
    let peer = match state.users.get(&user_id).await {
        Ok(Some(peer)) => peer,
        Ok(None) => return problem_details::not_found("user not found").into_response(),
        Err(e) => return storage_error(e),
    };

    let (page, limit) = crate::api::PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .resolve(50);

    let mut messages = match state.messages.conversation(&me.id, &peer.id, page, limit).await {
        Ok(messages) => messages,
        Err(e) => return storage_error(e),
    };
    // Stored pages come newest first; clients render oldest first.
    messages.reverse();

    let me_summary = UserSummary::from(&me);
    let peer_summary = UserSummary::from(&peer);
    let views: Vec<MessageView> = messages
        .into_iter()
        .map(|m| {
            let (sender, receiver) = if m.sender == me.id {
                (me_summary.clone(), peer_summary.clone())
            } else {
                (peer_summary.clone(), me_summary.clone())
            };
            MessageView::new(m, sender, receiver)
        })
        .collect();

    // Viewing the thread counts as reading it.
    if let Err(e) = state.messages.mark_read(&peer.id, &me.id).await {
        return storage_error(e);
    }

    (StatusCode::OK, Json(GetMessagesResponse { messages: views })).into_response()
}

/// POST /api/v1/messages
pub async fn send_message(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    Json(req): Json<SendMessageRequest>,
) -> Response {
    let content = req.content.trim();
    if content.is_empty() {
        return problem_details::bad_request("message content must not be empty").into_response();
    }
    if content.chars().count() > MAX_MESSAGE_LEN {
        return problem_details::bad_request(format!(
            "message content must be at most {MAX_MESSAGE_LEN} characters"
        ))
        .into_response();
    }

    let receiver = match state.users.get(&req.receiver_id).await {
        Ok(Some(receiver)) => receiver,
        Ok(None) => return problem_details::not_found("receiver not found").into_response(),
        Err(e) => return storage_error(e),
    };

    let message = match state.messages.create(&me.id, &receiver.id, content).await {
        Ok(message) => message,
        Err(e) => return storage_error(e),
    };

    let view = MessageView::new(message, UserSummary::from(&me), UserSummary::from(&receiver));
    (StatusCode::CREATED, Json(view)).into_response()
}

/// PUT /api/v1/messages/{user_id}/read
///
/// Mark everything the peer sent to the caller as read.
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    PathExtract(user_id): PathExtract<String>,
) -> Response {
    let peer = match state.users.get(&user_id).await {
        Ok(Some(peer)) => peer,
        Ok(None) => return problem_details::not_found("user not found").into_response(),
        Err(e) => return storage_error(e),
    };

    match state.messages.mark_read(&peer.id, &me.id).await {
        Ok(updated) => (StatusCode::OK, Json(MarkReadResponse { updated })).into_response(),
        Err(e) => storage_error(e),
    }
}
