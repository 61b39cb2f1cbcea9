//! Console email provider for development and testing.

use crate::providers::{EmailFuture, EmailMessage, EmailProvider};
use tracing::info;

/// Console email provider.
///
/// This provider logs emails to the console instead of sending them.
/// Useful for development where you don't want to send real emails.
///
/// # Examples
///
/// ```
/// use yamdb_auth::providers::{ConsoleEmailProvider, EmailMessage, EmailProvider};
///
/// # tokio_test::block_on(async {
/// let provider = ConsoleEmailProvider::new();
/// let message = EmailMessage::confirmation_code("admin@yamdb.fake", "user@example.com", "user", "1234");
/// provider.send(message).await?;
/// # Ok::<(), yamdb_auth::AuthError>(())
/// # }).unwrap();
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConsoleEmailProvider;

impl ConsoleEmailProvider {
    /// Create a new console email provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EmailProvider for ConsoleEmailProvider {
    fn send(&self, message: EmailMessage) -> EmailFuture<'_> {
        Box::pin(async move {
            info!(
                to = %message.to,
                subject = %message.subject,
                "📧 Email (Development Mode)"
            );
            println!("\n╔══════════════════════════════════════════════════════════════╗");
            println!("║ From: {:<55}║", message.from);
            println!("║ To: {:<57}║", message.to);
            println!("║ Subject: {:<52}║", message.subject);
            println!("╠══════════════════════════════════════════════════════════════╣");
            for line in message.body.lines() {
                println!("║ {line:<61}║");
            }
            println!("╚══════════════════════════════════════════════════════════════╝\n");
            Ok(())
        })
    }
}
