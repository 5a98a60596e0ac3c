//! SendGrid v3 `mail/send` backend.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::info;

use super::{Notification, Notifier, recipient};
use crate::config::{NotifyConfig, SendGridConfig};
use crate::error::NotifyError;

const BACKEND: &str = "sendgrid";

pub struct SendGridNotifier {
    client: reqwest::Client,
    config: NotifyConfig,
    sendgrid: SendGridConfig,
}

#[derive(Debug, Serialize)]
struct MailSend<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

impl SendGridNotifier {
    pub fn new(client: reqwest::Client, config: NotifyConfig, sendgrid: SendGridConfig) -> Self {
        Self {
            client,
            config,
            sendgrid,
        }
    }

    fn payload<'a>(&'a self, to: &'a str, notification: &'a Notification) -> MailSend<'a> {
        MailSend {
            personalizations: vec![Personalization {
                to: vec![Address {
                    email: to,
                    name: None,
                }],
            }],
            from: Address {
                email: &self.config.from_address,
                name: Some(&self.config.from_name),
            },
            subject: &notification.subject,
            content: vec![Content {
                kind: "text/plain",
                value: &notification.body,
            }],
        }
    }
}

#[async_trait]
impl Notifier for SendGridNotifier {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let to = recipient(&self.config, BACKEND)?;
        let api_key = self
            .sendgrid
            .api_key
            .as_ref()
            .ok_or_else(|| NotifyError::NotConfigured {
                backend: BACKEND.into(),
                key: "SENDGRID_API_KEY".into(),
            })?;

        let url = format!(
            "{}/v3/mail/send",
            self.sendgrid.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key.expose_secret())
            .json(&self.payload(to, notification))
            .send()
            .await
            .map_err(|e| NotifyError::SendFailed {
                backend: BACKEND.into(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                backend: BACKEND.into(),
                status: status.as_u16(),
                body,
            });
        }

        info!(to = to, "Notification email sent");
        Ok(())
    }
}
