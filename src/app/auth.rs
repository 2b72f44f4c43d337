use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::extract::{AppJson, AuthUser, bearer_token};
use super::response::{ApiError, ApiResult, ok, with_status};
use super::state::AppState;
use crate::auth::{hash_password, issue_session, resolve_session, revoke_session, verify_password};
use crate::model::{User, UserProfile, new_id};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

/// Minimal identity returned by login and verify.
#[derive(Debug, Serialize)]
struct Identity<'a> {
    #[serde(rename = "_id")]
    id: &'a str,
    name: &'a str,
    email: &'a str,
}

impl<'a> From<&'a User> for Identity<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: &user.id,
            name: &user.name,
            email: &user.email,
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn signup(
    State(state): State<AppState>,
    AppJson(req): AppJson<SignupRequest>,
) -> ApiResult<Response> {
    let name = req.name.trim();
    let email = normalize_email(&req.email);
    if name.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("All fields are required"));
    }

    let cost = state.password_cost;
    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(anyhow::Error::from)??;

    let user = User {
        id: new_id(),
        name: name.to_owned(),
        email,
        password_hash,
        avatar: String::new(),
        saved_recipes: Vec::new(),
        saved_meal_plans: Vec::new(),
        created_at: Utc::now(),
    };
    if !state.store.create_user(&user).await? {
        return Err(ApiError::Conflict("User already exists".to_owned()));
    }

    tracing::info!(user_id = %user.id, "user signed up");
    with_status(StatusCode::CREATED, json!({ "message": "Signup successful" }))
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> ApiResult<Response> {
    let email = normalize_email(&req.email);
    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let invalid = || ApiError::unauthorized("Invalid email or password");
    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(invalid)?;

    let hash = user.password_hash.clone();
    let password = req.password;
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(anyhow::Error::from)?;
    if !matches {
        return Err(invalid());
    }

    let token = issue_session(state.store.as_ref(), &user.id, state.session_ttl).await?;
    ok(json!({
        "message": "Login successful",
        "token": token,
        "user": Identity::from(&user),
    }))
}

/// Unlike the [`AuthUser`] extractor, a valid session for a deleted user is
/// reported as 404 here.
pub async fn verify(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let token = bearer_token(&headers).ok_or_else(|| ApiError::unauthorized("Token missing"))?;
    let session = resolve_session(state.store.as_ref(), token)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Token invalid or expired"))?;
    let user = state
        .store
        .get_user(&session.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    ok(json!({
        "message": "Token is valid",
        "user": Identity::from(&user),
    }))
}

pub async fn profile(auth: AuthUser) -> ApiResult<Response> {
    ok(json!({ "user": UserProfile::from(&auth.user) }))
}

/// Always succeeds; a presented token is revoked when it names a session.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    if let Some(token) = bearer_token(&headers)
        && let Err(err) = revoke_session(state.store.as_ref(), token).await
    {
        tracing::warn!(error = %format!("{err:#}"), "failed to revoke session");
    }
    ok(json!({ "message": "Logged out successfully" }))
}
