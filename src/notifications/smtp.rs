use async_trait::async_trait;
use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};

use crate::{
    config::EmailConfig,
    error::{AppError, Result},
    notifications::{Mailer, OutboundEmail},
};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Returns None unless the config is enabled and complete, so callers
    /// can fall back to the noop mailer.
    pub fn from_config(config: &EmailConfig) -> Option<Result<Self>> {
        if !config.enabled {
            return None;
        }
        let (host, username, password, from_address) = match (
            config.smtp_host.as_ref(),
            config.smtp_username.as_ref(),
            config.smtp_password.as_ref(),
            config.from_address.as_ref(),
        ) {
            (Some(h), Some(u), Some(p), Some(f)) => (h, u, p, f),
            _ => {
                tracing::warn!("Email enabled but SMTP configuration incomplete");
                return None;
            }
        };

        Some(Self::new(host, username, password, from_address))
    }

    pub fn new(host: &str, username: &str, password: &str, from_address: &str) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| AppError::Notification(format!("SMTP relay setup failed: {}", e)))?
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();

        let from = from_address
            .parse::<Mailbox>()
            .map_err(|e| AppError::Notification(format!("Invalid from address: {}", e)))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutboundEmail) -> Result<()> {
        let to = email
            .to
            .parse::<Mailbox>()
            .map_err(|e| AppError::Notification(format!("Invalid recipient address: {}", e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&email.subject)
            .body(email.body)
            .map_err(|e| AppError::Notification(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Notification(format!("SMTP send failed: {}", e)))?;

        tracing::debug!("Sent email to {} ({})", email.to, email.subject);
        Ok(())
    }
}
