//! Maps [`velesdb_core::Error`] onto the wire error shape `{"error": "..."}`
//! plus the HTTP status spec.md §7 assigns each taxonomy bucket.
//!
//! Grounded on the teacher's per-handler `(StatusCode, Json(ErrorResponse
//! {...}))` pairs (`handlers/collections.rs`, `handlers/points.rs`); unlike
//! the teacher this crate centralizes the mapping in one `IntoResponse` impl
//! driven by [`velesdb_core::ErrorCategory`] rather than repeating the match
//! at every call site.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use velesdb_core::{Error, ErrorCategory};

/// Wire shape for every error response: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
}

/// Wraps a [`velesdb_core::Error`] so it can be returned directly from a
/// handler and converted into the right status code + JSON body.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.category() {
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Conflict => StatusCode::CONFLICT,
            ErrorCategory::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// Shorthand for a bad-request response that never originated from
/// `velesdb_core` (missing JSON field, empty query, etc).
pub fn bad_request(message: impl Into<String>) -> ApiError {
    ApiError(Error::BadRequest(message.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let resp = ApiError(Error::CollectionNotFound("docs".into())).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("docs"));
    }

    #[tokio::test]
    async fn duplicate_id_maps_to_409() {
        let resp = ApiError(Error::DuplicateId("x".into())).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn dimension_mismatch_maps_to_400() {
        let resp = ApiError(Error::DimensionMismatch {
            expected: 3,
            actual: 4,
        })
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn io_error_maps_to_500() {
        let io = std::io::Error::other("disk full");
        let resp = ApiError(Error::Io(io)).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
