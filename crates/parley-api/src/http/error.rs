//! Application error type mapping to HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parley_types::error::RouterError;
use serde_json::json;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Routing failures; not-found becomes 404, everything else 500.
    Router(RouterError),
    /// Undecodable request body.
    BadRequest(String),
}

impl From<RouterError> for AppError {
    fn from(e: RouterError) -> Self {
        AppError::Router(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Router(RouterError::RecipientNotFound(identity)) => (
                StatusCode::NOT_FOUND,
                "RECIPIENT_NOT_FOUND",
                format!("user \"{identity}\": not found"),
            ),
            AppError::Router(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DELIVERY_ERROR",
                e.to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        if status.is_server_error() {
            tracing::warn!(%status, %message, "request failed");
        }

        let body = json!({
            "error": {
                "code": code,
                "message": message,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let response =
            AppError::from(RouterError::RecipientNotFound("ghost-owl".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_delivery_failure_maps_to_500() {
        let response =
            AppError::from(RouterError::Delivery("mailbox closed".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_bad_request_maps_to_400() {
        let response = AppError::BadRequest("not json".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
