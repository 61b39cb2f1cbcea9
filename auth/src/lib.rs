//! # YaMDb Authentication
//!
//! Passwordless registration for the YaMDb API: a user signs up with a
//! username and email, receives a numeric confirmation code by email, and
//! trades the code for a signed bearer token.
//!
//! ## Flow
//!
//! ```text
//! POST /auth/signup {username, email}  → code emailed
//! POST /auth/token  {username, code}   → {token}
//! Authorization: Bearer <token>        → current user
//! ```
//!
//! Storage and delivery are injected: [`Registration`] works against any
//! [`yamdb_core::repository::UserRepository`] and any
//! [`providers::EmailProvider`].

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod code;
pub mod config;
pub mod error;
pub mod metrics;
pub mod providers;
pub mod registration;
pub mod token;

#[cfg(feature = "test-utils")]
pub mod mocks;

pub use config::AuthConfig;
pub use error::{AuthError, Result, TokenError};
pub use registration::{Registration, SignupRequest, SignupResponse, TokenRequest, TokenResponse};
pub use token::{Claims, TokenIssuer};
