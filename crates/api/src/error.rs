//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::BookingError;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// No credential was presented.
    Unauthorized(String),
    /// The presented credential is invalid or expired.
    Forbidden(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Booking domain error.
    Booking(BookingError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Booking(err) => booking_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn booking_error_to_response(err: BookingError) -> (StatusCode, String) {
    match &err {
        BookingError::UnknownCourse { .. } | BookingError::InvalidDateTime { .. } => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        BookingError::AlreadyBooked { .. } => (StatusCode::CONFLICT, err.to_string()),
        BookingError::NotBooked { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        BookingError::Store(StoreError::DuplicateBooking { .. }) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        BookingError::Store(_) => {
            tracing::error!(error = %err, "store failure");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        ApiError::Booking(err)
    }
}
