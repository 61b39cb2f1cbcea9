//! Email delivery providers.
//!
//! Registration depends on the [`EmailProvider`] trait; the server picks a
//! concrete implementation from configuration.
//!
//! - [`ConsoleEmailProvider`]: logs messages, for development
//! - [`SmtpEmailProvider`]: sends through an SMTP relay with `lettre`
//! - `MockEmailProvider` (in [`crate::mocks`]): records messages for tests

pub mod console_email;
pub mod email;
pub mod smtp_email;

pub use console_email::ConsoleEmailProvider;
pub use email::{EmailFuture, EmailMessage, EmailProvider};
pub use smtp_email::{SmtpConfig, SmtpEmailProvider};
