//! Email provider trait.

use crate::error::Result;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`EmailProvider::send`].
pub type EmailFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// A plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// `From` header.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

impl EmailMessage {
    /// Subject of confirmation code emails.
    pub const CONFIRMATION_SUBJECT: &'static str = "YaMDb confirmation code";

    /// Build the email carrying a confirmation code.
    #[must_use]
    pub fn confirmation_code(from: &str, to: &str, username: &str, code: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: Self::CONFIRMATION_SUBJECT.to_string(),
            body: format!(
                "Hello, {username}.\n\
                 Your confirmation code for the YaMDb API: {code}\n\
                 Do not reply to this message, it was generated automatically."
            ),
        }
    }
}

/// Email provider.
///
/// This trait abstracts over email delivery services. It returns a boxed
/// future so providers can be stored as `Arc<dyn EmailProvider>`.
pub trait EmailProvider: Send + Sync {
    /// Deliver a message.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AuthError::EmailError`] if:
    /// - An address cannot be parsed
    /// - The relay is unreachable or rejects the message
    fn send(&self, message: EmailMessage) -> EmailFuture<'_>;
}
