//! Error types shared by every YaMDb crate.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, YamdbError>;

/// Field name used for errors that are not tied to a single input field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Validation messages keyed by the input field they refer to.
///
/// Serializes as `{"field": ["message", ...]}` so clients can attach each
/// message to the right form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Create an empty error set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Create an error set holding a single message.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    /// Add a message for `field`.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Record the error of a field validator, if it failed.
    pub fn check(&mut self, field: &str, outcome: std::result::Result<(), String>) {
        if let Err(message) = outcome {
            self.push(field, message);
        }
    }

    /// Move every message of `other` into `self`.
    pub fn merge(&mut self, other: Self) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Returns `true` if no message was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Returns `true` if at least one message was recorded for `field`.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok(())` when empty, otherwise a [`YamdbError::Validation`].
    ///
    /// # Errors
    ///
    /// Returns the collected messages as a validation error.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(YamdbError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Error taxonomy of the service.
///
/// Each variant maps onto one HTTP status family in the web layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum YamdbError {
    // ═══════════════════════════════════════════════════════════
    // Client Errors
    // ═══════════════════════════════════════════════════════════

    /// Input failed validation (duplicate unique field, malformed value,
    /// reserved username, wrong confirmation code...).
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// The addressed record does not exist.
    #[error("{resource} not found: {key}")]
    NotFound {
        /// Kind of record ("user", "title"...)
        resource: &'static str,
        /// Lookup key as supplied by the caller
        key: String,
    },

    /// No valid credentials were supplied.
    #[error("Authentication required: {0}")]
    NotAuthenticated(String),

    /// The caller is authenticated but the action is not allowed.
    #[error("Permission denied")]
    PermissionDenied,

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Email delivery failed.
    #[error("Email delivery failed: {0}")]
    EmailDelivery(String),

    /// Storage operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error (should not be exposed to users).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl YamdbError {
    /// Build a single-field validation error.
    #[must_use]
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }

    /// Build a not-found error.
    #[must_use]
    pub fn not_found(resource: &'static str, key: impl fmt::Display) -> Self {
        Self::NotFound {
            resource,
            key: key.to_string(),
        }
    }

    /// Returns `true` if this error is caused by the request rather than the server.
    ///
    /// # Examples
    ///
    /// ```
    /// # use yamdb_core::YamdbError;
    /// assert!(YamdbError::PermissionDenied.is_client_error());
    /// assert!(!YamdbError::Database("down".into()).is_client_error());
    /// ```
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::NotFound { .. }
                | Self::NotAuthenticated(_)
                | Self::PermissionDenied
        )
    }
}
