//! User administration and the self-service profile.
//!
//! - GET /api/v1/users - List users, newest first (admin)
//! - POST /api/v1/users - Create a user (admin)
//! - GET /api/v1/users/me - Caller's profile
//! - PATCH /api/v1/users/me - Update the caller's profile; role changes
//!   are ignored unless the caller is an admin
//! - GET/PATCH/DELETE /api/v1/users/{username} - Manage one user (admin)

use super::SearchQuery;
use crate::auth::middleware::CREDENTIALS_MISSING;
use crate::auth::{CurrentActor, authorize};
use crate::server::state::AppState;
use axum::{
    Json,
    extract::State,
    http::{Method, StatusCode},
};
use yamdb_core::YamdbError;
use yamdb_core::pagination::Page;
use yamdb_core::permissions::Policy;
use yamdb_core::user::{User, UserInput};
use yamdb_web::{JsonBody, PathParams, QueryParams, WebResult};

async fn user_by_username(state: &AppState, username: String) -> WebResult<User> {
    let user = state
        .users
        .find_user_by_username(username.clone())
        .await?
        .ok_or_else(|| YamdbError::not_found("user", username))?;
    Ok(user)
}

/// `GET /users`
pub async fn list_users(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    QueryParams(query): QueryParams<SearchQuery>,
) -> WebResult<Json<Page<User>>> {
    authorize(&state, Policy::AdminOnly, &method, &caller.actor)?;
    let page = state
        .users
        .list_users(query.search(), query.page_request(state.pagination.users))
        .await?;
    Ok(Json(page))
}

/// `POST /users`
pub async fn create_user(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    JsonBody(input): JsonBody<UserInput>,
) -> WebResult<(StatusCode, Json<User>)> {
    authorize(&state, Policy::AdminOnly, &method, &caller.actor)?;
    let user = state.users.create_user(input.into_new_user()?).await?;
    tracing::info!(username = %user.username, role = %user.role, "User created by admin");
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/{username}`
pub async fn get_user(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    PathParams(username): PathParams<String>,
) -> WebResult<Json<User>> {
    authorize(&state, Policy::AdminOnly, &method, &caller.actor)?;
    Ok(Json(user_by_username(&state, username).await?))
}

/// `PATCH /users/{username}`
pub async fn update_user(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    PathParams(username): PathParams<String>,
    JsonBody(input): JsonBody<UserInput>,
) -> WebResult<Json<User>> {
    authorize(&state, Policy::AdminOnly, &method, &caller.actor)?;
    let user = user_by_username(&state, username).await?;
    let patch = input.into_patch()?;
    let user = state.users.update_user(user.id, patch).await?;
    Ok(Json(user))
}

/// `DELETE /users/{username}`
pub async fn delete_user(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    PathParams(username): PathParams<String>,
) -> WebResult<StatusCode> {
    authorize(&state, Policy::AdminOnly, &method, &caller.actor)?;
    let user = user_by_username(&state, username).await?;
    state.users.delete_user(user.id).await?;
    tracing::info!(username = %user.username, "User deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /users/me`
pub async fn get_me(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
) -> WebResult<Json<User>> {
    authorize(&state, Policy::Authenticated, &method, &caller.actor)?;
    let user = caller.user.ok_or_else(|| {
        YamdbError::NotAuthenticated(CREDENTIALS_MISSING.to_string())
    })?;
    Ok(Json(user))
}

/// `PATCH /users/me`
pub async fn update_me(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentActor,
    JsonBody(input): JsonBody<UserInput>,
) -> WebResult<Json<User>> {
    authorize(&state, Policy::Authenticated, &method, &caller.actor)?;
    let principal = caller.principal()?;
    let patch = input.for_self_service(principal.is_admin()).into_patch()?;
    let user = state.users.update_user(principal.id, patch).await?;
    Ok(Json(user))
}
