//! Registration and token configuration.
//!
//! Configuration values are provided by the application, not hardcoded.

use chrono::Duration;
use std::ops::RangeInclusive;

/// Default confirmation code range, four decimal digits.
pub const DEFAULT_CODE_RANGE: RangeInclusive<u32> = 1000..=9999;

/// Default email sender.
pub const DEFAULT_EMAIL_FROM: &str = "YaMDb <admin@yamdb.fake>";

/// Registration and token settings.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC key used to sign access tokens.
    pub token_secret: Vec<u8>,

    /// Access token lifetime.
    ///
    /// Default: 24 hours
    pub token_ttl: Duration,

    /// Range confirmation codes are drawn from.
    ///
    /// Default: 1000..=9999
    pub code_range: RangeInclusive<u32>,

    /// Clear the code after a successful token exchange.
    ///
    /// Default: true
    pub single_use_codes: bool,

    /// `From` header of confirmation emails.
    pub email_from: String,
}

impl AuthConfig {
    /// Create configuration with the given signing secret.
    ///
    /// # Arguments
    ///
    /// * `token_secret` - HMAC key; at least 32 random bytes in production
    #[must_use]
    pub fn new(token_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            token_secret: token_secret.into(),
            token_ttl: Duration::hours(24),
            code_range: DEFAULT_CODE_RANGE,
            single_use_codes: true,
            email_from: DEFAULT_EMAIL_FROM.to_string(),
        }
    }

    /// Set access token lifetime.
    #[must_use]
    pub const fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Set the confirmation code range.
    #[must_use]
    pub fn with_code_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.code_range = range;
        self
    }

    /// Keep codes valid after use instead of clearing them.
    #[must_use]
    pub const fn with_single_use_codes(mut self, single_use: bool) -> Self {
        self.single_use_codes = single_use;
        self
    }

    /// Set the sender address of confirmation emails.
    #[must_use]
    pub fn with_email_from(mut self, from: impl Into<String>) -> Self {
        self.email_from = from.into();
        self
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("code_range", &self.code_range)
            .field("single_use_codes", &self.single_use_codes)
            .field("email_from", &self.email_from)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AuthConfig::new("secret");
        assert_eq!(config.token_ttl, Duration::hours(24));
        assert_eq!(config.code_range, 1000..=9999);
        assert!(config.single_use_codes);
    }

    #[test]
    fn debug_redacts_secret() {
        let config = AuthConfig::new("hunter2");
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
