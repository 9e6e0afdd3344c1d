//! Mailer that writes messages to the log instead of delivering them.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{Mailer, MailerError, OutgoingMail};

/// Development mailer used when no SMTP relay is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailerError> {
        info!(
            to = %mail.to,
            subject = %mail.subject,
            body = %mail.body,
            "email not delivered; no SMTP relay configured"
        );
        Ok(())
    }
}
