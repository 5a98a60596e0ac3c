//! Operator notification email.
//!
//! Two backends deliver the same [`Notification`]: the SendGrid v3 HTTP API
//! and plain SMTP through `lettre`.

mod sendgrid;
mod smtp;

pub use sendgrid::SendGridNotifier;
pub use smtp::SmtpNotifier;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{EmailBackend, NotifyConfig};
use crate::contact::model::{Classification, Submission};
use crate::error::NotifyError;

/// A composed plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

impl Notification {
    /// Compose the operator email. The message is embedded verbatim.
    pub fn compose(submission: &Submission, classification: &Classification) -> Self {
        let subject = format!(
            "[New inquiry] {} - {}",
            classification.category, submission.name
        );
        let body = format!(
            "Name: {name}\n\
             Email: {email}\n\
             Category: {category}\n\
             Spam score: {spam_score}\n\
             Summary: {summary}\n\
             \n\
             --- Original message ---\n\
             {message}",
            name = submission.name,
            email = submission.email,
            category = classification.category,
            spam_score = classification.spam_score,
            summary = classification.summary,
            message = submission.message,
        );
        Self { subject, body }
    }
}

/// Delivers notifications to the operator.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Build the notifier selected by configuration.
pub fn create_notifier(client: reqwest::Client, config: &NotifyConfig) -> Arc<dyn Notifier> {
    match &config.backend {
        EmailBackend::SendGrid(sendgrid) => {
            Arc::new(SendGridNotifier::new(client, config.clone(), sendgrid.clone()))
        }
        EmailBackend::Smtp(smtp) => Arc::new(SmtpNotifier::new(config.clone(), smtp.clone())),
    }
}

/// Operator address or a `NotConfigured` error for `backend`.
fn recipient<'a>(config: &'a NotifyConfig, backend: &str) -> Result<&'a str, NotifyError> {
    config
        .to
        .as_deref()
        .ok_or_else(|| NotifyError::NotConfigured {
            backend: backend.into(),
            key: "CONTACT_NOTIFY_TO".into(),
        })
}
