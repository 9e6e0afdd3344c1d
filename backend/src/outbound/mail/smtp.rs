//! SMTP delivery through lettre's Tokio transport.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::ports::{Mailer, MailerError, OutgoingMail};

/// Relay host, credentials and sender identity.
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Zeroizing<String>,
    pub from_email: String,
    pub from_name: String,
}

/// Mailer relaying through an authenticated SMTP server.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the relay transport and parse the sender mailbox.
    ///
    /// # Errors
    ///
    /// Returns [`MailerError::Build`] when the sender is not a valid mailbox
    /// or the relay host cannot be configured.
    pub fn new(settings: SmtpSettings) -> Result<Self, MailerError> {
        let from = sender(&settings.from_name, &settings.from_email)?;
        let credentials = Credentials::new(settings.username, settings.password.to_string());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .map_err(|err| MailerError::build(format!("SMTP relay error: {err}")))?
            .port(settings.port)
            .credentials(credentials)
            .build();
        Ok(Self { transport, from })
    }
}

fn sender(name: &str, email: &str) -> Result<Mailbox, MailerError> {
    format!("{name} <{email}>")
        .parse()
        .map_err(|err| MailerError::build(format!("invalid sender address: {err}")))
}

fn compose(from: Mailbox, mail: &OutgoingMail) -> Result<Message, MailerError> {
    let to: Mailbox = mail
        .to
        .as_ref()
        .parse()
        .map_err(|err| MailerError::build(format!("invalid recipient address: {err}")))?;
    Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(mail.body.clone())
        .map_err(|err| MailerError::build(err.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailerError> {
        let message = compose(self.from.clone(), mail)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|err| MailerError::transport(err.to_string()))?;
        info!(code = %response.code(), subject = %mail.subject, "email sent");
        Ok(())
    }
}
