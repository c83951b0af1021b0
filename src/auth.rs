//! Bearer credential validation.
//!
//! Tokens are opaque per-user credentials; issuance is external to this
//! system. Validation resolves a presented token to its user record,
//! rejecting unknown tokens, expired credentials, and deactivated users.
//! Token comparison happens inside the user store in constant time.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use thiserror::Error;
use tracing::warn;

use crate::handlers::problem_details;
use crate::server::AppState;
use crate::store::{User, UserStore};

// ============================================================================
// Errors
// ============================================================================

/// Why a credential was rejected. Fatal to the connection or request that
/// presented it, never to the process.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid bearer token")]
    InvalidToken,

    #[error("bearer token expired")]
    TokenExpired,

    #[error("user no longer exists")]
    UserNotFound,

    #[error("credential store unavailable")]
    Unavailable,
}

// ============================================================================
// Validation
// ============================================================================

/// Resolve a bearer token to its user record.
pub async fn authenticate(users: &dyn UserStore, token: Option<&str>) -> Result<User, AuthError> {
    let token = match token {
        Some(t) if !t.is_empty() => t,
        _ => return Err(AuthError::MissingToken),
    };

    let user = users.find_by_token(token).await.map_err(|e| {
        warn!(error = %e, "credential lookup failed");
        AuthError::Unavailable
    })?;

    let user = user.ok_or(AuthError::InvalidToken)?;
    if user.credential.is_expired(Utc::now()) {
        return Err(AuthError::TokenExpired);
    }
    if !user.is_active {
        return Err(AuthError::UserNotFound);
    }

    Ok(user)
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

// ============================================================================
// Middleware
// ============================================================================

/// The authenticated caller, inserted as a request extension by
/// [`require_bearer`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware that guards the API routes (`/api/v1/*`).
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = bearer_from_headers(request.headers()).map(str::to_owned);

    match authenticate(state.users.as_ref(), token.as_deref()).await {
        Ok(user) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        Err(AuthError::Unavailable) => {
            problem_details::internal_error("credential store unavailable").into_response()
        }
        Err(e) => problem_details::unauthorized(e.to_string()).into_response(),
    }
}
