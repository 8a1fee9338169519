use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Body sent for every 413 response
pub const FILE_TOO_LARGE: &str = "File Too Large";

/// Replaces the body of any 413 response with a fixed plain-text message
///
/// Applies whether the status came from the body limit layers or from a
/// handler.
pub async fn file_too_large(response: Response) -> Response {
    if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::info!("Rejected oversized request body");
        (StatusCode::PAYLOAD_TOO_LARGE, FILE_TOO_LARGE).into_response()
    } else {
        response
    }
}
