//! Authentication extractor and permission guards.
//!
//! [`CurrentActor`] resolves the bearer token (if any) to the current user
//! record on every request. Handlers then call [`authorize`] or
//! [`authorize_object`] with the endpoint's [`Policy`].
//!
//! # Usage
//!
//! ```rust,ignore
//! async fn delete_title(
//!     State(state): State<AppState>,
//!     method: Method,
//!     caller: CurrentActor,
//!     PathParams(id): PathParams<i64>,
//! ) -> WebResult<StatusCode> {
//!     authorize(&state, Policy::AdminOrReadOnly, &method, &caller.actor)?;
//!     // ...
//! }
//! ```

use crate::server::state::AppState;
use axum::{async_trait, extract::FromRequestParts, http::Method, http::request::Parts};
use yamdb_core::YamdbError;
use yamdb_core::feedback::Authored;
use yamdb_core::permissions::{Actor, Policy, Principal};
use yamdb_core::user::User;
use yamdb_web::{AppError, BearerToken};

/// Message for a request without credentials.
pub const CREDENTIALS_MISSING: &str = "Authentication credentials were not provided.";

/// The caller of a request.
///
/// Anonymous when no bearer token is sent. An invalid or expired token, or
/// one whose user was deleted, rejects the request with 401.
#[derive(Debug, Clone)]
pub struct CurrentActor {
    /// Permission-check view of the caller.
    pub actor: Actor,
    /// Full user record, when authenticated.
    pub user: Option<User>,
}

impl CurrentActor {
    /// An anonymous caller.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            actor: Actor::Anonymous,
            user: None,
        }
    }

    /// The authenticated principal.
    ///
    /// # Errors
    ///
    /// Returns 401 for anonymous callers.
    pub fn principal(&self) -> Result<&Principal, AppError> {
        self.actor
            .principal()
            .ok_or_else(|| YamdbError::NotAuthenticated(CREDENTIALS_MISSING.to_string()).into())
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let Some(token) = token else {
            return Ok(Self::anonymous());
        };

        let user = state.registration.authenticate(&token).await.map_err(|error| {
            tracing::debug!(error = %error, "Bearer token rejected");
            AppError::from(error)
        })?;
        Ok(Self {
            actor: Actor::Authenticated(Principal::from_user(&user)),
            user: Some(user),
        })
    }
}

/// Request-level permission check.
///
/// # Errors
///
/// 401 for anonymous callers and 403 for authenticated ones when `policy`
/// denies the request.
pub fn authorize(
    state: &AppState,
    policy: Policy,
    method: &Method,
    actor: &Actor,
) -> Result<(), AppError> {
    if state.permissions.has_permission(policy, method, actor) {
        Ok(())
    } else {
        Err(denied(actor))
    }
}

/// Object-level permission check against an existing record.
///
/// # Errors
///
/// 401 for anonymous callers and 403 for authenticated ones when `policy`
/// denies access to `object`.
pub fn authorize_object<O: Authored + ?Sized>(
    state: &AppState,
    policy: Policy,
    method: &Method,
    actor: &Actor,
    object: &O,
) -> Result<(), AppError> {
    if state
        .permissions
        .has_object_permission(policy, method, actor, object)
    {
        Ok(())
    } else {
        Err(denied(actor))
    }
}

fn denied(actor: &Actor) -> AppError {
    match actor {
        Actor::Anonymous => YamdbError::NotAuthenticated(CREDENTIALS_MISSING.to_string()).into(),
        Actor::Authenticated(principal) => {
            tracing::debug!(username = %principal.username, "Permission denied");
            YamdbError::PermissionDenied.into()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use yamdb_core::role::Role;
    use yamdb_core::user::UserId;

    fn actor(role: Role) -> Actor {
        Actor::Authenticated(Principal {
            id: UserId(1),
            username: "someone".to_string(),
            role,
            is_superuser: false,
        })
    }

    #[test]
    fn anonymous_denial_is_unauthorized() {
        assert_eq!(denied(&Actor::Anonymous).status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn authenticated_denial_is_forbidden() {
        assert_eq!(denied(&actor(Role::User)).status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn anonymous_has_no_principal() {
        let error = CurrentActor::anonymous().principal().unwrap_err();
        assert_eq!(error.status(), StatusCode::UNAUTHORIZED);
    }
}
