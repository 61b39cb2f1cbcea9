//! Signed access tokens.
//!
//! Tokens are compact JWTs signed with HMAC-SHA256 (`HS256`):
//! `base64url(header).base64url(claims).base64url(signature)`.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use chrono::Duration;
//! use yamdb_auth::token::TokenIssuer;
//! use yamdb_core::environment::SystemClock;
//! use yamdb_core::user::UserId;
//!
//! let issuer = TokenIssuer::new(b"secret".to_vec(), Duration::hours(1), Arc::new(SystemClock));
//! let token = issuer.issue(UserId(42))?;
//! assert_eq!(issuer.verify(&token)?.user_id, 42);
//! # Ok::<(), yamdb_auth::AuthError>(())
//! ```

use crate::error::{AuthError, Result, TokenError};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Duration;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use yamdb_core::environment::Clock;
use yamdb_core::user::UserId;

type HmacSha256 = Hmac<Sha256>;

/// `token_type` claim of access tokens.
pub const ACCESS_TOKEN_TYPE: &str = "access";

const ALGORITHM: &str = "HS256";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Always [`ACCESS_TOKEN_TYPE`].
    pub token_type: String,
    /// Subject user id.
    pub user_id: i64,
    /// Issued at, Unix seconds.
    pub iat: i64,
    /// Expires at, Unix seconds.
    pub exp: i64,
    /// Unique token id.
    pub jti: String,
}

/// Issues and verifies access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: Vec<u8>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Create an issuer.
    #[must_use]
    pub fn new(secret: Vec<u8>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { secret, ttl, clock }
    }

    /// Issue an access token for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ConfigurationError`] if the secret is empty.
    pub fn issue(&self, user: UserId) -> Result<String> {
        let now = self.clock.now();
        let claims = Claims {
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            user_id: user.0,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: uuid::Uuid::new_v4().simple().to_string(),
        };
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };

        let signing_input = format!(
            "{}.{}",
            encode_json(&header)?,
            encode_json(&claims)?
        );
        let signature = URL_SAFE_NO_PAD.encode(self.sign(signing_input.as_bytes())?);
        Ok(format!("{signing_input}.{signature}"))
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Token`] when the token is malformed, forged,
    /// expired or not an access token.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut parts = token.split('.');
        let (Some(header), Some(claims), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed.into());
        };

        let header: Header = decode_json(header)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm.into());
        }

        let provided = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;
        let expected = self.sign(token[..token.len() - signature.len() - 1].as_bytes())?;
        if !constant_time_eq::constant_time_eq(&provided, &expected) {
            return Err(TokenError::InvalidSignature.into());
        }

        let claims: Claims = decode_json(claims)?;
        if claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(TokenError::WrongType.into());
        }
        if claims.exp <= self.clock.now().timestamp() {
            return Err(TokenError::Expired.into());
        }
        Ok(claims)
    }

    fn sign(&self, input: &[u8]) -> Result<Vec<u8>> {
        if self.secret.is_empty() {
            return Err(AuthError::ConfigurationError(
                "token secret is empty".to_string(),
            ));
        }
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AuthError::ConfigurationError(format!("invalid token secret: {e}")))?;
        mac.update(input);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn encode_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_vec(value)
        .map(|bytes| URL_SAFE_NO_PAD.encode(bytes))
        .map_err(|e| AuthError::InternalError(format!("token serialization failed: {e}")))
}

fn decode_json<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed.into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    struct At(DateTime<Utc>);

    impl Clock for At {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn issuer_at(secret: &[u8], at: DateTime<Utc>) -> TokenIssuer {
        TokenIssuer::new(secret.to_vec(), Duration::hours(24), Arc::new(At(at)))
    }

    fn epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(1_735_689_600, 0).unwrap()
    }

    #[test]
    fn issued_token_carries_claims() {
        let issuer = issuer_at(b"secret", epoch());
        let token = issuer.issue(UserId(7)).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.token_type, "access");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn tokens_are_unique() {
        let issuer = issuer_at(b"secret", epoch());
        assert_ne!(issuer.issue(UserId(1)).unwrap(), issuer.issue(UserId(1)).unwrap());
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let token = issuer_at(b"other", epoch()).issue(UserId(1)).unwrap();
        assert_eq!(
            issuer_at(b"secret", epoch()).verify(&token),
            Err(AuthError::Token(TokenError::InvalidSignature))
        );
    }

    #[test]
    fn tampered_claims_are_rejected() {
        let issuer = issuer_at(b"secret", epoch());
        let token = issuer.issue(UserId(1)).unwrap();
        let forged_claims = URL_SAFE_NO_PAD.encode(
            br#"{"token_type":"access","user_id":2,"iat":0,"exp":9999999999,"jti":"x"}"#,
        );
        let parts: Vec<&str> = token.split('.').collect();
        let forged = format!("{}.{forged_claims}.{}", parts[0], parts[2]);
        assert_eq!(
            issuer.verify(&forged),
            Err(AuthError::Token(TokenError::InvalidSignature))
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issuer_at(b"secret", epoch()).issue(UserId(1)).unwrap();
        let later = issuer_at(b"secret", epoch() + Duration::hours(25));
        assert_eq!(
            later.verify(&token),
            Err(AuthError::Token(TokenError::Expired))
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let issuer = issuer_at(b"secret", epoch());
        for token in ["", "a.b", "a.b.c.d", "!!.??.%%"] {
            assert_eq!(
                issuer.verify(token),
                Err(AuthError::Token(TokenError::Malformed)),
                "{token}"
            );
        }
    }

    #[test]
    fn empty_secret_is_a_configuration_error() {
        let issuer = issuer_at(b"", epoch());
        assert!(matches!(
            issuer.issue(UserId(1)),
            Err(AuthError::ConfigurationError(_))
        ));
    }
}
