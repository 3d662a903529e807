//! Test sends
//!
//! Substitutes placeholders into rendered HTML and hands the result to a
//! mail transport: a real SMTP relay when configured, the in-process
//! preview mailbox otherwise.

use async_trait::async_trait;

use crate::error::Result;

pub mod mailer;
pub mod preview;
pub mod smtp;

pub use mailer::{SendTestRequest, SendTestResponse, TestMailer, DEFAULT_SUBJECT};
pub use preview::{PreviewMailbox, StoredMessage};
pub use smtp::SmtpTransport;

/// A fully prepared HTML message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Result of handing a message to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub message_id: String,
    /// Where the message can be viewed, for disposable transports
    pub preview_url: Option<String>,
}

/// Mail transport
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver one message
    async fn deliver(&self, message: OutgoingMessage) -> Result<Delivery>;

    /// Whether messages end up in a disposable preview mailbox
    fn is_preview(&self) -> bool;
}
