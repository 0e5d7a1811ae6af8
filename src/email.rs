//! Sending password reset emails over SMTP.

use std::env;

use lettre::{
    Message, SmtpTransport, Transport, message::Mailbox,
    transport::smtp::authentication::Credentials,
};

use crate::Error;

/// The environment variable holding the SMTP relay host name.
const SMTP_HOST_VAR: &str = "DEPENSIER_SMTP_HOST";
/// The environment variable holding the SMTP user name.
const SMTP_USERNAME_VAR: &str = "DEPENSIER_SMTP_USERNAME";
/// The environment variable holding the SMTP password.
const SMTP_PASSWORD_VAR: &str = "DEPENSIER_SMTP_PASSWORD";
/// The environment variable holding the sender address for outgoing email.
const SMTP_FROM_VAR: &str = "DEPENSIER_SMTP_FROM";

/// SMTP settings for sending password reset emails.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// The SMTP relay host name.
    pub smtp_host: String,
    /// The user name for authenticating with the SMTP relay.
    pub smtp_username: String,
    /// The password for authenticating with the SMTP relay.
    pub smtp_password: String,
    /// The sender address for outgoing email.
    pub from_address: String,
}

impl EmailConfig {
    /// Read the SMTP settings from environment variables.
    ///
    /// Returns `None` if any of the settings are missing, in which case the
    /// application runs without email and password reset links cannot be sent.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            smtp_host: env::var(SMTP_HOST_VAR).ok()?,
            smtp_username: env::var(SMTP_USERNAME_VAR).ok()?,
            smtp_password: env::var(SMTP_PASSWORD_VAR).ok()?,
            from_address: env::var(SMTP_FROM_VAR).ok()?,
        })
    }
}

/// Send a password reset email containing `reset_url` to `recipient`.
///
/// The send happens synchronously over a STARTTLS connection to the
/// configured relay.
///
/// # Errors
/// Returns [Error::EmailError] if the email could not be built or sent.
pub fn send_reset_email(
    config: &EmailConfig,
    recipient: &str,
    reset_url: &str,
) -> Result<(), Error> {
    let email = build_reset_email(config, recipient, reset_url)?;

    let mailer = SmtpTransport::starttls_relay(&config.smtp_host)
        .map_err(|error| Error::EmailError(error.to_string()))?
        .credentials(Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        ))
        .build();

    mailer
        .send(&email)
        .map_err(|error| Error::EmailError(error.to_string()))?;

    Ok(())
}

fn build_reset_email(
    config: &EmailConfig,
    recipient: &str,
    reset_url: &str,
) -> Result<Message, Error> {
    let from: Mailbox = format!("Depensier <{}>", config.from_address)
        .parse()
        .map_err(|error| Error::EmailError(format!("invalid sender address: {error}")))?;
    let to: Mailbox = recipient
        .parse()
        .map_err(|error| Error::EmailError(format!("invalid recipient address: {error}")))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject("Password Reset Request")
        .body(format!(
            "To reset your password, visit the following link:\n\
            {reset_url}\n\
            \n\
            If you did not make this request, please ignore this email.\n"
        ))
        .map_err(|error| Error::EmailError(error.to_string()))
}
