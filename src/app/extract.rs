use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};

use super::response::ApiError;
use super::state::AppState;
use crate::auth::resolve_session;
use crate::model::User;

/// JSON body whose rejection renders through [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// The authenticated caller. Rejects before the handler body runs.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Unauthorized: No token provided"))?;

        let session = resolve_session(state.store.as_ref(), token)
            .await?
            .ok_or_else(|| ApiError::Forbidden("Unauthorized: Invalid or expired token".to_owned()))?;

        let user = state
            .store
            .get_user(&session.user_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Unauthorized: User not found"))?;

        Ok(AuthUser { user })
    }
}
