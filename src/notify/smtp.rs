//! SMTP backend via lettre.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;
use tracing::info;

use super::{Notification, Notifier, recipient};
use crate::config::{NotifyConfig, SmtpConfig};
use crate::error::NotifyError;

const BACKEND: &str = "smtp";

pub struct SmtpNotifier {
    config: NotifyConfig,
    smtp: SmtpConfig,
}

impl SmtpNotifier {
    pub fn new(config: NotifyConfig, smtp: SmtpConfig) -> Self {
        Self { config, smtp }
    }

    /// Build the MIME message.
    fn build_message(&self, to: &str, notification: &Notification) -> Result<Message, NotifyError> {
        let from_address: Address = self.config.from_address.parse().map_err(|e| {
            NotifyError::InvalidAddress {
                address: self.config.from_address.clone(),
                reason: format!("{e}"),
            }
        })?;
        let from = Mailbox::new(Some(self.config.from_name.clone()), from_address);
        let to: Mailbox = to.parse().map_err(|e| NotifyError::InvalidAddress {
            address: to.to_string(),
            reason: format!("{e}"),
        })?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(notification.subject.as_str())
            .body(notification.body.clone())
            .map_err(|e| NotifyError::SendFailed {
                backend: BACKEND.into(),
                reason: format!("Failed to build email: {e}"),
            })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let to = recipient(&self.config, BACKEND)?;
        let password = self
            .smtp
            .password
            .as_ref()
            .ok_or_else(|| NotifyError::NotConfigured {
                backend: BACKEND.into(),
                key: "SMTP_PASSWORD".into(),
            })?;

        let email = self.build_message(to, notification)?;
        let creds = Credentials::new(
            self.smtp.username.clone(),
            password.expose_secret().to_string(),
        );
        let transport = SmtpTransport::starttls_relay(&self.smtp.host)
            .map_err(|e| NotifyError::SendFailed {
                backend: BACKEND.into(),
                reason: format!("SMTP relay error: {e}"),
            })?
            .port(self.smtp.port)
            .credentials(creds)
            .build();

        // lettre's SmtpTransport is blocking.
        tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .map_err(|e| NotifyError::SendFailed {
                backend: BACKEND.into(),
                reason: format!("SMTP task failed: {e}"),
            })?
            .map_err(|e| NotifyError::SendFailed {
                backend: BACKEND.into(),
                reason: format!("SMTP send failed: {e}"),
            })?;

        info!(to = to, host = %self.smtp.host, "Notification email sent");
        Ok(())
    }
}
