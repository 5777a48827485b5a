//! Gateway-generated responses.
//!
//! # Responsibilities
//! - Build the 404 returned when no mount matches
//! - Build the 502 returned when an upstream is unreachable
//!
//! Responses produced by handler groups pass through untouched.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// JSON body of gateway-generated error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'static str,
    pub path: &'a str,
}

/// No mount owns `path`.
pub fn not_found(path: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "not_found",
            path,
        }),
    )
        .into_response()
}

/// The upstream behind a mount could not be reached.
pub fn bad_gateway(path: &str) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorBody {
            error: "bad_gateway",
            path,
        }),
    )
        .into_response()
}
