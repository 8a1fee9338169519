use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use tower_cookies::Cookies;

use crate::api::errors::ApiError;
use crate::app::AppState;
use crate::auth::federated::username_from_identity;
use crate::auth::session::{verify_session_token, SESSION_COOKIE};
use crate::domain::repositories::{RepositoryError, User, UserRepository};

/// User the current request is authenticated as, if any
///
/// Filled in by [`load_current_user`] before routing. Handlers take it as an
/// extractor:
///
/// ```rust,ignore
/// async fn handler(CurrentUser(user): CurrentUser) -> String {
///     user.map(|u| u.username.to_string()).unwrap_or_default()
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Resolves the user behind a session identity
///
/// A missing identity, one that maps to no valid username, or a username
/// with no stored user all yield an anonymous request.
pub async fn resolve_current_user(
    users: &dyn UserRepository,
    openid: Option<&str>,
) -> Result<CurrentUser, RepositoryError> {
    let Some(openid) = openid else {
        return Ok(CurrentUser::anonymous());
    };

    let username = match username_from_identity(openid) {
        Ok(username) => username,
        Err(e) => {
            tracing::debug!("Session identity has no username: {}", e);
            return Ok(CurrentUser::anonymous());
        }
    };

    Ok(CurrentUser(users.find_by_username(&username).await?))
}

/// Before-request hook attaching [`CurrentUser`] to the request
pub async fn load_current_user(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let openid = cookies.get(SESSION_COOKIE).and_then(|cookie| {
        verify_session_token(cookie.value(), &state.config.secret_key)
            .map_err(|e| tracing::debug!("Ignoring session cookie: {}", e))
            .ok()
            .map(|claims| claims.openid)
    });

    let current = resolve_current_user(state.users.as_ref(), openid.as_deref()).await?;
    request.extensions_mut().insert(current);

    Ok(next.run(request).await)
}
