//! Signup and token endpoints.
//!
//! Both endpoints are open to anonymous callers.

use crate::server::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use yamdb_auth::{SignupRequest, SignupResponse, TokenRequest, TokenResponse};
use yamdb_web::{JsonBody, WebResult};

/// Register a user and email a confirmation code.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/auth/signup
/// Content-Type: application/json
///
/// {
///   "username": "critic",
///   "email": "critic@example.com"
/// }
/// ```
///
/// Repeating the request with the same username and email sends a new code.
///
/// # Response
///
/// `200 OK` echoing `{username, email}`; `400` with field errors; `503` if
/// the email could not be sent.
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SignupRequest>,
) -> WebResult<Json<SignupResponse>> {
    let response = state.registration.signup(request).await?;
    Ok(Json(response))
}

/// Exchange a username and confirmation code for an access token.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/auth/token
/// Content-Type: application/json
///
/// {
///   "username": "critic",
///   "confirmation_code": "4821"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with `{"token": "..."}`; `400` with a `confirmation_code`
/// error for a wrong code; `404` for an unknown username.
pub async fn obtain_token(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<TokenRequest>,
) -> WebResult<(StatusCode, Json<TokenResponse>)> {
    let response = state.registration.obtain_token(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
