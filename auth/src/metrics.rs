//! Registration metrics.
//!
//! ## Counters
//! - `yamdb_signups_total{outcome}` - Signups by outcome (created, resent, invalid, email_failed)
//! - `yamdb_tokens_issued_total` - Access tokens issued
//! - `yamdb_token_rejections_total` - Token requests refused for a wrong code

/// Counter of signup attempts.
pub const SIGNUPS_TOTAL: &str = "yamdb_signups_total";
/// Counter of issued access tokens.
pub const TOKENS_ISSUED_TOTAL: &str = "yamdb_tokens_issued_total";
/// Counter of refused token requests.
pub const TOKEN_REJECTIONS_TOTAL: &str = "yamdb_token_rejections_total";

/// How a signup request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupOutcome {
    /// New account, code sent.
    Created,
    /// Existing pending account, code regenerated and resent.
    Resent,
    /// Rejected by validation.
    Invalid,
    /// Email delivery failed.
    EmailFailed,
}

impl SignupOutcome {
    /// Label value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Resent => "resent",
            Self::Invalid => "invalid",
            Self::EmailFailed => "email_failed",
        }
    }
}

/// Record a finished signup request.
pub fn record_signup(outcome: SignupOutcome) {
    metrics::counter!(SIGNUPS_TOTAL, "outcome" => outcome.as_str()).increment(1);
    tracing::debug!(outcome = outcome.as_str(), "Recorded signup metric");
}

/// Record an issued access token.
pub fn record_token_issued() {
    metrics::counter!(TOKENS_ISSUED_TOTAL).increment(1);
}

/// Record a token request refused for a wrong confirmation code.
pub fn record_token_rejected() {
    metrics::counter!(TOKEN_REJECTIONS_TOTAL).increment(1);
    tracing::debug!("Recorded token_rejected metric");
}
