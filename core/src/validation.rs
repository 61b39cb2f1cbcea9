//! Field validators.
//!
//! Every validator returns `Err(message)` with a user-facing message so the
//! caller can collect failures into [`FieldErrors`] keyed by input field.
//! The same functions back signup, admin user management and profile edits,
//! so a rule is never checked in two different ways.

use crate::error::FieldErrors;
use std::ops::RangeInclusive;

/// Username that would shadow the `/users/me` endpoint.
pub const RESERVED_USERNAME: &str = "me";

/// Maximum username length.
pub const USERNAME_MAX_LENGTH: usize = 150;

/// Maximum email length.
pub const EMAIL_MAX_LENGTH: usize = 254;

/// Maximum length of first and last names.
pub const PERSON_NAME_MAX_LENGTH: usize = 150;

/// Maximum length of category, genre and title names.
pub const CATALOG_NAME_MAX_LENGTH: usize = 200;

/// Maximum length of a title description.
pub const DESCRIPTION_MAX_LENGTH: usize = 200;

/// Maximum slug length.
pub const SLUG_MAX_LENGTH: usize = 50;

/// Allowed review scores.
pub const SCORE_RANGE: RangeInclusive<i32> = 1..=10;

/// Message used when a required field is missing.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Take a required value, recording an error when it is absent.
pub fn required<T>(errors: &mut FieldErrors, field: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        errors.push(field, REQUIRED_MESSAGE);
    }
    value
}

/// Validate a username.
///
/// Usernames are made of letters, digits and `.@+-_`, are at most
/// [`USERNAME_MAX_LENGTH`] characters, and may not be [`RESERVED_USERNAME`].
///
/// # Errors
///
/// Returns a message describing the first rule the value breaks.
///
/// # Examples
///
/// ```
/// use yamdb_core::validation::validate_username;
///
/// assert!(validate_username("reader.42@home").is_ok());
/// assert!(validate_username("me").is_err());
/// assert!(validate_username("no spaces").is_err());
/// ```
pub fn validate_username(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("This field may not be blank.".to_string());
    }
    validate_max_length(value, USERNAME_MAX_LENGTH)?;

    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-');
    if !value.chars().all(allowed) {
        return Err(
            "Enter a valid username. It may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        );
    }

    if value == RESERVED_USERNAME {
        return Err(format!(
            "\"{RESERVED_USERNAME}\" cannot be used as a username."
        ));
    }

    Ok(())
}

/// Validate email address format.
///
/// This performs basic RFC 5322 validation:
/// - Must contain exactly one `@`
/// - Must have non-empty local and domain parts
/// - Domain must contain a dot and no empty labels
/// - Length must be between 3 and [`EMAIL_MAX_LENGTH`] characters
///
/// # Examples
///
/// ```
/// use yamdb_core::validation::is_valid_email;
///
/// assert!(is_valid_email("user@example.com"));
/// assert!(is_valid_email("user+tag@subdomain.example.com"));
/// assert!(!is_valid_email("invalid"));
/// assert!(!is_valid_email("@example.com"));
/// assert!(!is_valid_email("user@"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > EMAIL_MAX_LENGTH {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    if !domain.contains('.') {
        return false;
    }

    let valid_local_chars =
        |c: char| c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_');
    let valid_domain_chars = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-');

    if !local.chars().all(valid_local_chars) || !domain.chars().all(valid_domain_chars) {
        return false;
    }

    domain.split('.').all(|part| !part.is_empty())
}

/// Validate an email address.
///
/// # Errors
///
/// Returns a message when the address is malformed or too long.
pub fn validate_email(value: &str) -> Result<(), String> {
    if value.chars().count() > EMAIL_MAX_LENGTH {
        return validate_max_length(value, EMAIL_MAX_LENGTH);
    }
    if is_valid_email(value) {
        Ok(())
    } else {
        Err("Enter a valid email address.".to_string())
    }
}

/// Validate a category or genre slug.
///
/// # Errors
///
/// Returns a message when the slug is empty, too long or has characters
/// outside `[-a-zA-Z0-9_]`.
pub fn validate_slug(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("This field may not be blank.".to_string());
    }
    validate_max_length(value, SLUG_MAX_LENGTH)?;
    if value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
    {
        Ok(())
    } else {
        Err(
            "Enter a valid \"slug\" consisting of letters, numbers, underscores or hyphens."
                .to_string(),
        )
    }
}

/// Validate a non-blank name of at most `max` characters.
///
/// # Errors
///
/// Returns a message when the value is blank or too long.
pub fn validate_name(value: &str, max: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("This field may not be blank.".to_string());
    }
    validate_max_length(value, max)
}

/// Validate that free text is not blank.
///
/// # Errors
///
/// Returns a message when the value is empty or whitespace.
pub fn validate_text(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err("This field may not be blank.".to_string())
    } else {
        Ok(())
    }
}

/// Validate a length limit counted in characters.
///
/// # Errors
///
/// Returns a message when `value` has more than `max` characters.
pub fn validate_max_length(value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        Err(format!("Ensure this field has no more than {max} characters."))
    } else {
        Ok(())
    }
}

/// Validate a review score.
///
/// # Errors
///
/// Returns a message when the score is outside [`SCORE_RANGE`].
pub fn validate_score(score: i32) -> Result<(), String> {
    if SCORE_RANGE.contains(&score) {
        Ok(())
    } else {
        Err(format!(
            "Score must be between {} and {}.",
            SCORE_RANGE.start(),
            SCORE_RANGE.end()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reserved_username_is_rejected() {
        let err = validate_username("me").unwrap_err();
        assert!(err.contains("\"me\""));
    }

    #[test]
    fn username_allows_django_charset() {
        assert!(validate_username("jane_doe").is_ok());
        assert!(validate_username("a.b@c+d-e").is_ok());
        assert!(validate_username("ñandú").is_ok());
        assert!(validate_username("me2").is_ok());
        assert!(validate_username("Me").is_ok());
    }

    #[test]
    fn username_rejects_other_characters() {
        assert!(validate_username("jane doe").is_err());
        assert!(validate_username("jane/doe").is_err());
        assert!(validate_username("").is_err());
    }

    #[test]
    fn username_length_is_limited() {
        assert!(validate_username(&"a".repeat(USERNAME_MAX_LENGTH)).is_ok());
        assert!(validate_username(&"a".repeat(USERNAME_MAX_LENGTH + 1)).is_err());
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("reader@yamdb.fake").is_ok());
        assert!(validate_email("reader@localhost").is_err());
        assert!(validate_email("reader@@yamdb.fake").is_err());
        assert!(validate_email("reader@yamdb..fake").is_err());
        let long = format!("{}@example.com", "a".repeat(EMAIL_MAX_LENGTH));
        assert!(validate_email(&long).unwrap_err().contains("no more than"));
    }

    #[test]
    fn slug_validation() {
        assert!(validate_slug("sci-fi_2").is_ok());
        assert!(validate_slug("sci fi").is_err());
        assert!(validate_slug("").is_err());
        assert!(validate_slug(&"s".repeat(SLUG_MAX_LENGTH + 1)).is_err());
    }

    #[test]
    fn score_bounds() {
        assert!(validate_score(0).is_err());
        assert!(validate_score(1).is_ok());
        assert!(validate_score(10).is_ok());
        assert!(validate_score(11).is_err());
    }

    #[test]
    fn required_records_missing_field() {
        let mut errors = FieldErrors::new();
        let value: Option<String> = required(&mut errors, "email", None);
        assert!(value.is_none());
        assert_eq!(errors.get("email"), Some(&[REQUIRED_MESSAGE.to_string()][..]));
    }

    proptest! {
        #[test]
        fn any_whitespace_in_username_is_rejected(prefix in "[a-z]{1,10}", suffix in "[a-z]{1,10}") {
            let username = format!("{prefix} {suffix}");
            prop_assert!(validate_username(&username).is_err());
        }

        #[test]
        fn scores_in_range_are_accepted(score in 1i32..=10) {
            prop_assert!(validate_score(score).is_ok());
        }
    }
}
