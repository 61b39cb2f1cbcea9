//! User accounts.

use crate::error::{FieldErrors, Result};
use crate::role::Role;
use crate::validation::{
    PERSON_NAME_MAX_LENGTH, required, validate_email, validate_max_length, validate_username,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Database identifier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered user.
///
/// Serializes to the public profile shape; the id, superuser flag and
/// confirmation code never leave the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Identifier.
    #[serde(skip)]
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Free-form biography.
    pub bio: String,
    /// Authorization role.
    pub role: Role,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Operator account flag; treated like the admin role.
    #[serde(skip)]
    pub is_superuser: bool,
    /// Outstanding confirmation code, if one was issued.
    #[serde(skip)]
    pub confirmation_code: Option<String>,
}

/// Validated data for a new user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Role, `user` unless an admin picks another.
    pub role: Role,
    /// Biography.
    pub bio: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Operator account flag.
    pub is_superuser: bool,
}

impl NewUser {
    /// Minimal account as created by signup.
    #[must_use]
    pub fn signup(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            role: Role::User,
            bio: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            is_superuser: false,
        }
    }
}

/// Partial update of a user. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    /// New username.
    pub username: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New role.
    pub role: Option<Role>,
    /// New biography.
    pub bio: Option<String>,
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
}

impl UserPatch {
    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.bio.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
    }

    /// Apply the patch to a user record in place.
    pub fn apply(self, user: &mut User) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(bio) = self.bio {
            user.bio = bio;
        }
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
    }
}

/// User payload as sent by clients, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInput {
    /// Login name.
    pub username: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Role name.
    pub role: Option<String>,
    /// Biography.
    pub bio: Option<String>,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
}

impl UserInput {
    /// Restrict a payload to what the account owner may change.
    ///
    /// Non-admins cannot change their own role; the field is dropped
    /// before validation, so an unknown role name is ignored rather than
    /// rejected.
    #[must_use]
    pub fn for_self_service(mut self, caller_is_admin: bool) -> Self {
        if !caller_is_admin {
            self.role = None;
        }
        self
    }

    /// Validate a payload for account creation by an admin.
    ///
    /// # Errors
    ///
    /// Returns [`crate::YamdbError::Validation`] with one entry per bad field.
    pub fn into_new_user(self) -> Result<NewUser> {
        let mut errors = FieldErrors::new();
        let username = required(&mut errors, "username", self.username);
        let email = required(&mut errors, "email", self.email);
        let patch = Self {
            username: username.clone(),
            email: email.clone(),
            ..self
        }
        .validated_patch(&mut errors);
        errors.into_result()?;

        Ok(NewUser {
            username: username.unwrap_or_default(),
            email: email.unwrap_or_default(),
            role: patch.role.unwrap_or_default(),
            bio: patch.bio.unwrap_or_default(),
            first_name: patch.first_name.unwrap_or_default(),
            last_name: patch.last_name.unwrap_or_default(),
            is_superuser: false,
        })
    }

    /// Validate a payload for a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`crate::YamdbError::Validation`] with one entry per bad field.
    pub fn into_patch(self) -> Result<UserPatch> {
        let mut errors = FieldErrors::new();
        let patch = self.validated_patch(&mut errors);
        errors.into_result()?;
        Ok(patch)
    }

    fn validated_patch(self, errors: &mut FieldErrors) -> UserPatch {
        if let Some(username) = &self.username {
            errors.check("username", validate_username(username));
        }
        if let Some(email) = &self.email {
            errors.check("email", validate_email(email));
        }
        if let Some(first_name) = &self.first_name {
            errors.check("first_name", validate_max_length(first_name, PERSON_NAME_MAX_LENGTH));
        }
        if let Some(last_name) = &self.last_name {
            errors.check("last_name", validate_max_length(last_name, PERSON_NAME_MAX_LENGTH));
        }
        let role = match self.role.as_deref().map(str::parse::<Role>) {
            Some(Ok(role)) => Some(role),
            Some(Err(err)) => {
                errors.push("role", err.to_string());
                None
            }
            None => None,
        };

        UserPatch {
            username: self.username,
            email: self.email,
            role,
            bio: self.bio,
            first_name: self.first_name,
            last_name: self.last_name,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::YamdbError;

    fn input(username: &str, email: &str) -> UserInput {
        UserInput {
            username: Some(username.to_string()),
            email: Some(email.to_string()),
            ..UserInput::default()
        }
    }

    #[test]
    fn new_user_defaults_to_user_role() {
        let user = input("reader", "reader@yamdb.fake").into_new_user().unwrap();
        assert_eq!(user.role, Role::User);
        assert!(user.bio.is_empty());
    }

    #[test]
    fn new_user_requires_username_and_email() {
        let Err(YamdbError::Validation(errors)) = UserInput::default().into_new_user() else {
            panic!("expected validation error");
        };
        assert!(errors.contains("username"));
        assert!(errors.contains("email"));
    }

    #[test]
    fn new_user_rejects_reserved_username() {
        let Err(YamdbError::Validation(errors)) =
            input("me", "me@yamdb.fake").into_new_user()
        else {
            panic!("expected validation error");
        };
        assert!(errors.contains("username"));
    }

    #[test]
    fn unknown_role_is_a_field_error() {
        let payload = UserInput {
            role: Some("overlord".to_string()),
            ..input("reader", "reader@yamdb.fake")
        };
        let Err(YamdbError::Validation(errors)) = payload.into_new_user() else {
            panic!("expected validation error");
        };
        assert!(errors.contains("role"));
    }

    #[test]
    fn self_service_drops_role_for_non_admins() {
        let input = UserInput {
            role: Some("overlord".to_string()),
            bio: Some("hi".to_string()),
            ..UserInput::default()
        };
        let patch = input.clone().for_self_service(false).into_patch().unwrap();
        assert_eq!(patch.role, None);
        assert_eq!(patch.bio.as_deref(), Some("hi"));

        let err = input.for_self_service(true).into_patch().unwrap_err();
        assert!(matches!(err, YamdbError::Validation(ref e) if e.contains("role")));
    }

    #[test]
    fn patch_applies_only_given_fields() {
        let mut user = User {
            id: UserId(1),
            username: "reader".to_string(),
            email: "reader@yamdb.fake".to_string(),
            bio: String::new(),
            role: Role::User,
            first_name: "Ann".to_string(),
            last_name: String::new(),
            is_superuser: false,
            confirmation_code: None,
        };
        UserPatch {
            last_name: Some("Lee".to_string()),
            ..UserPatch::default()
        }
        .apply(&mut user);
        assert_eq!(user.first_name, "Ann");
        assert_eq!(user.last_name, "Lee");
    }

    #[test]
    fn profile_serialization_hides_secrets() {
        let user = User {
            id: UserId(7),
            username: "reader".to_string(),
            email: "reader@yamdb.fake".to_string(),
            bio: String::new(),
            role: Role::Moderator,
            first_name: String::new(),
            last_name: String::new(),
            is_superuser: true,
            confirmation_code: Some("1234".to_string()),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "moderator");
        assert!(json.get("confirmation_code").is_none());
        assert!(json.get("id").is_none());
    }
}
