//! Transactional email over SMTP.
//!
//! Only one message exists today: the newsletter welcome note. Delivery is
//! best-effort from the caller's point of view; the subscription is already
//! recorded before the send is attempted.

use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use thiserror::Error;

use marigold_core::Email;

use crate::config::EmailConfig;

/// Errors from email delivery.
#[derive(Debug, Error)]
pub enum MailerError {
    /// Failed to build the message.
    #[error("failed to build email: {0}")]
    Build(#[from] lettre::error::Error),

    /// The sender address in config is malformed.
    #[error("invalid from address: {0}")]
    FromAddress(#[from] lettre::address::AddressError),

    /// SMTP transport failure.
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// SMTP email sender.
#[derive(Clone)]
pub struct EmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Build the SMTP transport from config.
    ///
    /// # Errors
    ///
    /// Returns `MailerError::Smtp` if the relay host is invalid.
    pub fn new(config: &EmailConfig) -> Result<Self, MailerError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.expose_secret().to_string(),
            ))
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }

    /// Send the newsletter welcome email.
    ///
    /// # Errors
    ///
    /// Returns `MailerError` if the message cannot be built or delivered.
    pub async fn send_welcome(&self, to: &Email) -> Result<(), MailerError> {
        let from: Mailbox = self.from_address.parse()?;
        let recipient: Mailbox = to.as_str().parse()?;

        let text = "Welcome to the Marigold newsletter!\n\n\
            You'll be the first to hear about new arrivals, restocks and \
            seasonal offers.\n\n\
            If this wasn't you, just ignore this email.\n";

        let html = "<div style=\"font-family: sans-serif; max-width: 480px;\">\
            <h2>Welcome to the Marigold newsletter!</h2>\
            <p>You'll be the first to hear about new arrivals, restocks and \
            seasonal offers.</p>\
            <p style=\"color: #888; font-size: 12px;\">If this wasn't you, \
            just ignore this email.</p>\
            </div>";

        let message = Message::builder()
            .from(from)
            .to(recipient)
            .subject("Welcome to Marigold")
            .multipart(MultiPart::alternative_plain_html(
                text.to_string(),
                html.to_string(),
            ))?;

        self.transport.send(message).await?;
        Ok(())
    }
}
