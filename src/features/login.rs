use axum::{
    extract::{Query, State},
    http::{header::HOST, HeaderMap},
    response::Response,
    routing::get,
};
use std::collections::HashMap;
use tower_cookies::{Cookie, Cookies};
use url::Url;

use crate::api::errors::ApiError;
use crate::api::handlers::root::{found, redirect_to_endpoint, LANDING_ENDPOINT};
use crate::api::middleware::CurrentUser;
use crate::api::routes::Blueprint;
use crate::app::AppState;
use crate::auth::session::{create_session_token, SESSION_COOKIE};

/// Endpoint the identity provider sends the browser back to
pub const RETURN_ENDPOINT: &str = "login.finish";

pub fn blueprint() -> Blueprint {
    Blueprint::new("login")
        .route("/login", "do_login", get(login))
        .route("/login/finish", "finish", get(finish))
        .route("/logout", "do_logout", get(logout))
}

/// Hand the browser over to the identity provider
///
/// GET /login
pub async fn login(
    State(state): State<AppState>,
    current: CurrentUser,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if current.user().is_some() {
        return redirect_to_endpoint(&state, LANDING_ENDPOINT);
    }

    let finish_path = state
        .urls
        .url_for(RETURN_ENDPOINT)
        .ok_or_else(|| ApiError::internal_server_error("No route for the login return endpoint"))?;
    let return_to = return_url(&headers, &state, finish_path);

    let mut provider = Url::parse(&state.config.openid_provider).map_err(|e| {
        ApiError::internal_server_error(format!("Invalid OpenID provider URL: {}", e))
    })?;
    provider
        .query_pairs_mut()
        .append_pair("openid.mode", "checkid_setup")
        .append_pair("openid.return_to", &return_to);

    Ok(found(provider.as_str()))
}

/// Open a session for the identity the provider vouched for
///
/// GET /login/finish?openid.mode=id_res&openid.identity=...
pub async fn finish(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let identity = state
        .identity
        .verify(&params)
        .await
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    let token = create_session_token(
        &identity,
        &state.config.secret_key,
        state.config.session_ttl_hours,
    )
    .map_err(|e| ApiError::internal_server_error(format!("Failed to create session: {}", e)))?;

    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);
    tracing::info!(identity = %identity, "Session opened");

    redirect_to_endpoint(&state, LANDING_ENDPOINT)
}

/// Drop the session and go back to the landing page
///
/// GET /logout
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Result<Response, ApiError> {
    if cookies.get(SESSION_COOKIE).is_some() {
        let mut cookie = Cookie::from(SESSION_COOKIE);
        cookie.set_path("/");
        cookies.remove(cookie);
        tracing::debug!("Session closed");
    }
    redirect_to_endpoint(&state, LANDING_ENDPOINT)
}

fn return_url(headers: &HeaderMap, state: &AppState, path: &str) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| state.config.bind_address.to_string());

    format!("{}://{}{}", scheme, host, path)
}
