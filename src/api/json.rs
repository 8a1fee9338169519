// JSON output for API and page responses
// chrono values serialize as ISO-8601 strings through their serde impls

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::api::errors::ApiError;

/// JSON responder used by the feature handlers
///
/// Unlike `axum::Json`, a value that fails to serialize is reported as an
/// `ApiError` with a logged message.
#[derive(Debug, Clone)]
pub struct WebJson<T>(pub T);

impl<T: Serialize> WebJson<T> {
    /// Serializes the wrapped value to bytes
    pub fn to_vec(&self) -> Result<Vec<u8>, ApiError> {
        serde_json::to_vec(&self.0).map_err(|e| {
            ApiError::internal_server_error(format!("Failed to serialize response: {}", e))
        })
    }
}

impl<T: Serialize> IntoResponse for WebJson<T> {
    fn into_response(self) -> Response {
        match self.to_vec() {
            Ok(bytes) => (
                StatusCode::OK,
                [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                bytes,
            )
                .into_response(),
            Err(error) => error.into_response(),
        }
    }
}
