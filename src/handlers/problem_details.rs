//! Problem-details style JSON error responses.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ProblemDetails {
    pub title: &'static str,
    pub status: u16,
    pub detail: String,
}

fn problem(
    status: StatusCode,
    title: &'static str,
    detail: impl Into<String>,
) -> (StatusCode, Json<ProblemDetails>) {
    (
        status,
        Json(ProblemDetails {
            title,
            status: status.as_u16(),
            detail: detail.into(),
        }),
    )
}

pub fn bad_request(detail: impl Into<String>) -> (StatusCode, Json<ProblemDetails>) {
    problem(StatusCode::BAD_REQUEST, "Bad Request", detail)
}

pub fn unauthorized(detail: impl Into<String>) -> (StatusCode, Json<ProblemDetails>) {
    problem(StatusCode::UNAUTHORIZED, "Unauthorized", detail)
}

pub fn forbidden(detail: impl Into<String>) -> (StatusCode, Json<ProblemDetails>) {
    problem(StatusCode::FORBIDDEN, "Forbidden", detail)
}

pub fn not_found(detail: impl Into<String>) -> (StatusCode, Json<ProblemDetails>) {
    problem(StatusCode::NOT_FOUND, "Not Found", detail)
}

pub fn internal_error(detail: impl Into<String>) -> (StatusCode, Json<ProblemDetails>) {
    problem(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", detail)
}
