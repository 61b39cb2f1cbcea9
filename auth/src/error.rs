//! Error types for token handling and email delivery.

use thiserror::Error;
use yamdb_core::YamdbError;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Why a bearer token was refused.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Not three base64url segments, or undecodable claims.
    #[error("Token is malformed")]
    Malformed,

    /// Signed with a different algorithm than HS256.
    #[error("Unsupported token algorithm")]
    UnsupportedAlgorithm,

    /// Signature does not match the payload.
    #[error("Token signature is invalid")]
    InvalidSignature,

    /// `exp` lies in the past.
    #[error("Token has expired")]
    Expired,

    /// Not an access token.
    #[error("Token has wrong type")]
    WrongType,
}

/// Error taxonomy of the auth crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Authentication Errors
    // ═══════════════════════════════════════════════════════════

    /// A bearer token was rejected.
    #[error(transparent)]
    Token(#[from] TokenError),

    // ═══════════════════════════════════════════════════════════
    // Delivery Errors
    // ═══════════════════════════════════════════════════════════

    /// Email sending failed.
    #[error("Email error: {0}")]
    EmailError(String),

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Invalid configuration (empty secret, bad SMTP settings...).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Internal error (should not be exposed to users).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<AuthError> for YamdbError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Token(token) => Self::NotAuthenticated(token.to_string()),
            AuthError::EmailError(message) => Self::EmailDelivery(message),
            AuthError::ConfigurationError(message) | AuthError::InternalError(message) => {
                Self::Internal(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_errors_become_not_authenticated() {
        let error: YamdbError = AuthError::from(TokenError::Expired).into();
        assert_eq!(
            error,
            YamdbError::NotAuthenticated("Token has expired".to_string())
        );
    }

    #[test]
    fn email_errors_become_delivery_failures() {
        let error: YamdbError = AuthError::EmailError("relay refused".to_string()).into();
        assert!(matches!(error, YamdbError::EmailDelivery(_)));
        assert!(!error.is_client_error());
    }
}
