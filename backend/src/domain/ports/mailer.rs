//! Port for outbound transactional email.

use async_trait::async_trait;

use crate::domain::EmailAddress;

use super::define_port_error;

define_port_error! {
    /// Errors raised by mail adapters.
    pub enum MailerError {
        /// The message could not be assembled.
        Build { message: String } => "email could not be built: {message}",
        /// The transport refused or failed to deliver the message.
        Transport { message: String } => "email transport failed: {message}",
    }
}

/// Plain-text message addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: EmailAddress,
    pub subject: String,
    pub body: String,
}

/// Deliver transactional email.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send `mail`, returning once the transport accepted it.
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailerError>;
}
