//! WebSocket endpoint.
//!
//! Authentication happens at the HTTP handshake: a missing or invalid token
//! refuses the connection with 401 before any socket frame is processed.
//! After the upgrade the socket splits into a writer task draining the
//! session's outbound channel and a reader loop that handles inbound frames
//! in receipt order.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::debug;

use crate::auth;
use crate::handlers::problem_details;
use crate::server::AppState;
use crate::store::User;

use super::{ChatServer, ClientEvent, ErrorCode, ServerEvent};

#[derive(Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    token: Option<String>,
}

/// GET /ws?token=<bearer>
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let user = match auth::authenticate(state.users.as_ref(), query.token.as_deref()).await {
        Ok(user) => user,
        Err(e) => return problem_details::unauthorized(e.to_string()).into_response(),
    };

    let chat = state.chat.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, chat, user))
}

async fn handle_socket(socket: WebSocket, chat: ChatServer, user: User) {
    let (mut session, mut outbound) = chat.connect(&user);
    let (mut ws_tx, mut ws_rx) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(t) => t,
                Err(_) => continue,
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = ws_rx.next().await {
        let message = match frame {
            Ok(m) => m,
            Err(e) => {
                debug!(user_id = %session.user().id, error = %e, "socket read error");
                break;
            }
        };

        match message {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(text.as_str()) {
                Ok(event) => session.handle(event).await,
                Err(e) => session.emit(ServerEvent::MessageError {
                    code: ErrorCode::Validation,
                    message: format!("malformed event: {e}"),
                }),
            },
            Message::Close(_) => break,
            // Binary frames are not part of the protocol; ping/pong is
            // handled by the websocket layer.
            _ => {}
        }
    }

    session.disconnect().await;
    writer.abort();
}
