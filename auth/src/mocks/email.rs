//! Mock email provider for testing.

use crate::error::AuthError;
use crate::providers::{EmailFuture, EmailMessage, EmailProvider};
use std::sync::{Arc, Mutex};

/// Mock email provider.
///
/// Records every message instead of sending it. Clones share the outbox.
#[derive(Debug, Clone)]
pub struct MockEmailProvider {
    /// Whether to simulate success or failure.
    pub should_succeed: bool,
    outbox: Arc<Mutex<Vec<EmailMessage>>>,
}

impl MockEmailProvider {
    /// Create a new mock email provider that succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            should_succeed: true,
            outbox: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a provider whose deliveries always fail.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            should_succeed: false,
            ..Self::new()
        }
    }

    /// Messages delivered so far.
    #[must_use]
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.outbox.lock().unwrap().clone()
    }

    /// Confirmation code from the latest message sent to `to`.
    #[must_use]
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|m| m.to == to)
            .and_then(|m| {
                m.body
                    .lines()
                    .filter(|line| line.contains("confirmation code"))
                    .find_map(|line| line.rsplit_once(": "))
                    .map(|(_, code)| code.trim().to_string())
            })
    }
}

impl Default for MockEmailProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailProvider for MockEmailProvider {
    fn send(&self, message: EmailMessage) -> EmailFuture<'_> {
        let outbox = Arc::clone(&self.outbox);
        let should_succeed = self.should_succeed;

        Box::pin(async move {
            if !should_succeed {
                return Err(AuthError::EmailError("mock delivery failure".to_string()));
            }
            outbox
                .lock()
                .map_err(|_| AuthError::InternalError("outbox lock poisoned".to_string()))?
                .push(message);
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_messages_and_extracts_code() {
        let provider = MockEmailProvider::new();
        provider
            .send(EmailMessage::confirmation_code("f@x.io", "a@b.io", "reader", "4821"))
            .await
            .unwrap();
        assert_eq!(provider.sent().len(), 1);
        assert_eq!(provider.last_code_for("a@b.io").as_deref(), Some("4821"));
        assert_eq!(provider.last_code_for("c@d.io"), None);
    }

    #[tokio::test]
    async fn failing_provider_records_nothing() {
        let provider = MockEmailProvider::failing();
        let result = provider
            .send(EmailMessage::confirmation_code("f@x.io", "a@b.io", "reader", "1"))
            .await;
        assert!(matches!(result, Err(AuthError::EmailError(_))));
        assert!(provider.sent().is_empty());
    }
}
