//! Versioned API handlers.

mod events;
mod messages;
mod users;

pub use events::{
    create_event, delete_event, get_event, join_event, leave_event, list_events, update_event,
};
pub use messages::{get_messages, list_conversations, mark_read, send_message};
pub use users::{get_user, list_users, update_profile};

use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::handlers::problem_details;
use crate::store::StorageError;

/// Map a storage failure to a generic 500; details stay in the logs.
pub(crate) fn storage_error(e: StorageError) -> Response {
    warn!(error = %e, "storage operation failed");
    problem_details::internal_error("storage unavailable").into_response()
}
