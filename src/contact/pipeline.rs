//! Classify, store, notify.
//!
//! The three provider calls run strictly in sequence. Each has its own
//! failure policy:
//!
//! - classification failures degrade to default values,
//! - storage failures are logged and otherwise ignored,
//! - notification failures abort the submission.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::model::{Classification, Submission};
use crate::classify::Classifier;
use crate::error::PipelineError;
use crate::notify::{Notification, Notifier};
use crate::store::{SubmissionRecord, SubmissionStore};

/// Runs a validated submission through the provider calls.
#[derive(Clone)]
pub struct SubmissionPipeline {
    classifier: Arc<dyn Classifier>,
    store: Arc<dyn SubmissionStore>,
    notifier: Arc<dyn Notifier>,
}

impl SubmissionPipeline {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        store: Arc<dyn SubmissionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            classifier,
            store,
            notifier,
        }
    }

    /// Classify, falling back to the default classification on any error.
    pub async fn classify(&self, submission: &Submission) -> Classification {
        match self.classifier.classify(submission).await {
            Ok(classification) => classification,
            Err(e) => {
                warn!(
                    classifier = self.classifier.name(),
                    error = %e,
                    "Classification unavailable, using defaults"
                );
                Classification::default()
            }
        }
    }

    /// Process one submission. Only a notification failure is returned.
    pub async fn process(&self, submission: &Submission) -> Result<Classification, PipelineError> {
        let classification = self.classify(submission).await;

        let record = SubmissionRecord::new(submission, &classification);
        if let Err(e) = self.store.insert(&record).await {
            error!(
                store = self.store.name(),
                error = %e,
                "Failed to persist submission; continuing with notification"
            );
        }

        let notification = Notification::compose(submission, &classification);
        self.notifier.send(&notification).await?;

        info!(
            category = %classification.category,
            spam_score = classification.spam_score,
            "Submission processed"
        );
        Ok(classification)
    }
}
