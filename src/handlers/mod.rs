//! Per-route request handlers.
//!
//! Each handler validates input shape, delegates to the store, and
//! assembles a response. Failures follow one taxonomy: validation → 400
//! with a descriptive message and no mutation, authorization → 401 before
//! any handler logic, unknown id → 404, anything else → a generic 500. All
//! failures are terminal for the request.

use crate::http::{Response, StatusCode};

pub mod messages;
pub mod meta;
pub mod search;
pub mod users;

/// A validation failure: required field absent or empty. No mutation occurred.
pub(crate) fn bad_request(message: &str) -> Response {
    Response::json(
        StatusCode::BadRequest,
        &serde_json::json!({"error": message}),
    )
}

/// An authorization failure: credential absent or mismatched.
pub(crate) fn unauthorized() -> Response {
    Response::json(
        StatusCode::Unauthorized,
        &serde_json::json!({"error": "Invalid or missing API key"}),
    )
}

/// The structured not-found body shared by unknown ids and unmatched routes.
pub(crate) fn not_found() -> Response {
    Response::json(
        StatusCode::NotFound,
        &serde_json::json!({"error": "Resource not found", "status": 404}),
    )
}
