//! Signup and token exchange.
//!
//! ```text
//! unregistered ──signup──▶ pending confirmation ──token──▶ authenticated
//!                              ▲        │
//!                              └─signup─┘  (same username and email: new code)
//! ```
//!
//! Signup stores a numeric code on the account and emails it. Exchanging the
//! username and that code yields a signed access token. Requests then carry
//! the token as a bearer credential and [`Registration::authenticate`]
//! resolves it back to the current user record.

use crate::code::ConfirmationCodeGenerator;
use crate::config::AuthConfig;
use crate::metrics::{SignupOutcome, record_signup, record_token_issued, record_token_rejected};
use crate::providers::{EmailMessage, EmailProvider};
use crate::token::TokenIssuer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use yamdb_core::environment::Clock;
use yamdb_core::error::{FieldErrors, Result, YamdbError};
use yamdb_core::repository::{EMAIL_TAKEN, USERNAME_TAKEN, UserRepository};
use yamdb_core::role::Role;
use yamdb_core::user::{NewUser, User, UserId, UserPatch};
use yamdb_core::validation::{required, validate_email, validate_username};

/// Message returned for a wrong confirmation code.
pub const INVALID_CODE: &str = "Invalid confirmation code.";

/// `POST /auth/signup` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupRequest {
    /// Desired username.
    pub username: Option<String>,
    /// Email address the code is sent to.
    pub email: Option<String>,
}

/// `POST /auth/signup` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupResponse {
    /// Registered username.
    pub username: String,
    /// Registered email.
    pub email: String,
}

/// `POST /auth/token` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    /// Username given at signup.
    pub username: Option<String>,
    /// Code received by email.
    pub confirmation_code: Option<String>,
}

/// `POST /auth/token` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenResponse {
    /// Bearer access token.
    pub token: String,
}

/// Registration service.
#[derive(Clone)]
pub struct Registration {
    users: Arc<dyn UserRepository>,
    mailer: Arc<dyn EmailProvider>,
    issuer: TokenIssuer,
    codes: ConfirmationCodeGenerator,
    config: AuthConfig,
}

impl Registration {
    /// Create the service.
    #[must_use]
    pub fn new(
        config: AuthConfig,
        users: Arc<dyn UserRepository>,
        mailer: Arc<dyn EmailProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            issuer: TokenIssuer::new(config.token_secret.clone(), config.token_ttl, clock),
            codes: ConfirmationCodeGenerator::new(config.code_range.clone()),
            users,
            mailer,
            config,
        }
    }

    /// The token issuer, for callers that verify tokens themselves.
    #[must_use]
    pub const fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Register a user, or re-send the code to a pending one, and email a
    /// confirmation code.
    ///
    /// # Errors
    ///
    /// - [`YamdbError::Validation`] for missing or malformed fields, the
    ///   reserved username, or a username or email taken by another account
    /// - [`YamdbError::EmailDelivery`] if the email cannot be sent
    pub async fn signup(&self, request: SignupRequest) -> Result<SignupResponse> {
        let (username, email) = match validate_signup(request) {
            Ok(fields) => fields,
            Err(error) => {
                record_signup(SignupOutcome::Invalid);
                return Err(error);
            }
        };

        let (user, outcome) = match self.pending_user(&username, &email).await? {
            Some(user) => (user, SignupOutcome::Resent),
            None => {
                let user = self
                    .users
                    .create_user(NewUser::signup(username, email))
                    .await
                    .inspect_err(|_| record_signup(SignupOutcome::Invalid))?;
                (user, SignupOutcome::Created)
            }
        };

        let code = self.codes.generate();
        self.users
            .set_confirmation_code(user.id, Some(code.clone()))
            .await?;

        let message = EmailMessage::confirmation_code(
            &self.config.email_from,
            &user.email,
            &user.username,
            &code,
        );
        if let Err(error) = self.mailer.send(message).await {
            warn!(username = %user.username, error = %error, "Confirmation email failed");
            record_signup(SignupOutcome::EmailFailed);
            return Err(error.into());
        }

        info!(username = %user.username, outcome = outcome.as_str(), "Confirmation code sent");
        record_signup(outcome);
        Ok(SignupResponse {
            username: user.username,
            email: user.email,
        })
    }

    /// Find the account a repeated signup refers to.
    ///
    /// Returns the user when both username and email match one account,
    /// `None` when neither is taken, and field errors otherwise.
    async fn pending_user(&self, username: &str, email: &str) -> Result<Option<User>> {
        let by_username = self.users.find_user_by_username(username.to_string()).await?;
        if let Some(user) = by_username.as_ref().filter(|u| u.email == email) {
            return Ok(Some(user.clone()));
        }

        let by_email = self.users.find_user_by_email(email.to_string()).await?;
        let mut errors = FieldErrors::new();
        if by_username.is_some() {
            errors.push("username", USERNAME_TAKEN);
        }
        if by_email.is_some() {
            errors.push("email", EMAIL_TAKEN);
        }
        if !errors.is_empty() {
            record_signup(SignupOutcome::Invalid);
        }
        errors.into_result()?;
        Ok(None)
    }

    /// Exchange a username and confirmation code for an access token.
    ///
    /// # Errors
    ///
    /// - [`YamdbError::Validation`] for missing fields or a wrong code
    ///   (keyed by `confirmation_code`)
    /// - [`YamdbError::NotFound`] for an unknown username
    pub async fn obtain_token(&self, request: TokenRequest) -> Result<TokenResponse> {
        let mut errors = FieldErrors::new();
        let username = required(&mut errors, "username", request.username);
        let code = required(&mut errors, "confirmation_code", request.confirmation_code);
        errors.into_result()?;
        let (username, code) = (username.unwrap_or_default(), code.unwrap_or_default());

        let user = self
            .users
            .find_user_by_username(username.clone())
            .await?
            .ok_or_else(|| YamdbError::not_found("user", &username))?;

        let matches = user
            .confirmation_code
            .as_deref()
            .is_some_and(|stored| constant_time_eq::constant_time_eq(stored.as_bytes(), code.as_bytes()));
        if !matches {
            warn!(username = %user.username, "Rejected confirmation code");
            record_token_rejected();
            return Err(YamdbError::field("confirmation_code", INVALID_CODE));
        }

        if self.config.single_use_codes {
            self.users.set_confirmation_code(user.id, None).await?;
        }

        let token = self.issuer.issue(user.id)?;
        record_token_issued();
        info!(username = %user.username, "Access token issued");
        Ok(TokenResponse { token })
    }

    /// Resolve a bearer token to the current user record.
    ///
    /// The user is re-read on every call so role changes and deletions take
    /// effect immediately.
    ///
    /// # Errors
    ///
    /// Returns [`YamdbError::NotAuthenticated`] for an invalid token or a
    /// deleted user.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.issuer.verify(token)?;
        self.users
            .get_user(UserId(claims.user_id))
            .await?
            .ok_or_else(|| YamdbError::NotAuthenticated("User not found".to_string()))
    }

    /// Make sure an administrator account exists.
    ///
    /// Creates the account with the admin role and superuser flag, or
    /// promotes an existing account with that username.
    ///
    /// # Errors
    ///
    /// Propagates validation and storage errors.
    pub async fn ensure_superuser(&self, username: &str, email: &str) -> Result<User> {
        let mut errors = FieldErrors::new();
        errors.check("username", validate_username(username));
        errors.check("email", validate_email(email));
        errors.into_result()?;

        if let Some(user) = self.users.find_user_by_username(username.to_string()).await? {
            if user.role == Role::Admin {
                return Ok(user);
            }
            let patch = UserPatch {
                role: Some(Role::Admin),
                ..UserPatch::default()
            };
            info!(username, "Promoting bootstrap administrator");
            return self.users.update_user(user.id, patch).await;
        }

        info!(username, "Creating bootstrap administrator");
        self.users
            .create_user(NewUser {
                role: Role::Admin,
                is_superuser: true,
                ..NewUser::signup(username, email)
            })
            .await
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("issuer", &self.issuer)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn validate_signup(request: SignupRequest) -> Result<(String, String)> {
    let mut errors = FieldErrors::new();
    let username = required(&mut errors, "username", request.username);
    let email = required(&mut errors, "email", request.email);
    if let Some(username) = &username {
        errors.check("username", validate_username(username));
    }
    if let Some(email) = &email {
        errors.check("email", validate_email(email));
    }
    errors.into_result()?;
    Ok((username.unwrap_or_default(), email.unwrap_or_default()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn signup_validation_is_field_scoped() {
        let Err(YamdbError::Validation(errors)) = validate_signup(SignupRequest {
            username: Some("me".to_string()),
            email: Some("nope".to_string()),
        }) else {
            unreachable!("expected validation error");
        };
        assert!(errors.contains("username"));
        assert!(errors.contains("email"));
    }

    #[test]
    fn signup_requires_both_fields() {
        let Err(YamdbError::Validation(errors)) = validate_signup(SignupRequest::default()) else {
            unreachable!("expected validation error");
        };
        assert_eq!(errors.get("username").unwrap().len(), 1);
        assert_eq!(errors.get("email").unwrap().len(), 1);
    }
}
