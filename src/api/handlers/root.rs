use axum::{
    extract::State,
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
};

use crate::api::errors::ApiError;
use crate::app::AppState;

/// Endpoint the root path redirects to
pub const LANDING_ENDPOINT: &str = "summary.index";

/// 302 Found pointing at `location`
///
/// `axum::response::Redirect` only offers 303, 307 and 308.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

/// Resolves an endpoint name to a 302 redirect
pub fn redirect_to_endpoint(state: &AppState, endpoint: &str) -> Result<Response, ApiError> {
    let location = state
        .urls
        .url_for(endpoint)
        .ok_or_else(|| ApiError::internal_server_error(format!("No route for endpoint {}", endpoint)))?;
    Ok(found(location))
}

/// Redirect to the summary page
///
/// GET /
pub async fn index(State(state): State<AppState>) -> Result<Response, ApiError> {
    redirect_to_endpoint(&state, LANDING_ENDPOINT)
}
