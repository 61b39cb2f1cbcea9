//! SMTP email provider implementation using Lettre.

use crate::error::{AuthError, Result};
use crate::providers::{EmailFuture, EmailMessage, EmailProvider};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

/// SMTP relay settings.
#[derive(Clone)]
pub struct SmtpConfig {
    /// SMTP server address (e.g. "smtp.gmail.com").
    pub host: String,
    /// SMTP server port, usually 587 for STARTTLS.
    pub port: u16,
    /// Authentication username; no authentication when `None`.
    pub username: Option<String>,
    /// Authentication password.
    pub password: Option<String>,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// SMTP email provider using Lettre.
///
/// This provider sends real emails via SMTP, suitable for production use.
/// The transport pools connections, so one provider should be shared.
///
/// # Examples
///
/// ```no_run
/// use yamdb_auth::providers::{SmtpConfig, SmtpEmailProvider};
///
/// let provider = SmtpEmailProvider::new(&SmtpConfig {
///     host: "smtp.gmail.com".to_string(),
///     port: 587,
///     username: Some("user@gmail.com".to_string()),
///     password: Some("app_password".to_string()),
/// })?;
/// # Ok::<(), yamdb_auth::AuthError>(())
/// ```
#[derive(Clone)]
pub struct SmtpEmailProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailProvider {
    /// Create a new SMTP email provider.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ConfigurationError`] if the relay cannot be configured.
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| AuthError::ConfigurationError(format!("SMTP relay error: {e}")))?
            .port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }
        Ok(Self {
            transport: builder.build(),
        })
    }

    fn build_message(message: &EmailMessage) -> Result<Message> {
        Message::builder()
            .from(
                message
                    .from
                    .parse()
                    .map_err(|e| AuthError::EmailError(format!("Invalid from address: {e}")))?,
            )
            .to(message
                .to
                .parse()
                .map_err(|e| AuthError::EmailError(format!("Invalid to address: {e}")))?)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| AuthError::EmailError(format!("Failed to build email: {e}")))
    }
}

impl EmailProvider for SmtpEmailProvider {
    fn send(&self, message: EmailMessage) -> EmailFuture<'_> {
        Box::pin(async move {
            let email = Self::build_message(&message)?;
            self.transport
                .send(email)
                .await
                .map_err(|e| AuthError::EmailError(format!("Failed to send email: {e}")))?;
            debug!(to = %message.to, "email sent");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unparsable_recipient() {
        let message = EmailMessage::confirmation_code("admin@yamdb.fake", "not an address", "u", "1");
        assert!(matches!(
            SmtpEmailProvider::build_message(&message),
            Err(AuthError::EmailError(_))
        ));
    }

    #[test]
    fn builds_plain_text_message() {
        let message =
            EmailMessage::confirmation_code("YaMDb <admin@yamdb.fake>", "a@b.io", "u", "1234");
        assert!(SmtpEmailProvider::build_message(&message).is_ok());
    }

    #[test]
    fn debug_redacts_password() {
        let config = SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: Some("user".to_string()),
            password: Some("hunter2".to_string()),
        };
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
