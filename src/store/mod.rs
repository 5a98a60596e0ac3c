//! Submission persistence.

mod supabase;

pub use supabase::SupabaseStore;

use async_trait::async_trait;
use serde::Serialize;

use crate::contact::model::{Category, Classification, Submission};
use crate::error::StoreError;

/// One row of the submissions table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionRecord {
    pub name: String,
    pub email: String,
    pub message: String,
    pub ip: String,
    pub user_agent: String,
    pub claude_summary: String,
    pub claude_category: Category,
    pub spam_score: f64,
}

impl SubmissionRecord {
    pub fn new(submission: &Submission, classification: &Classification) -> Self {
        Self {
            name: submission.name.clone(),
            email: submission.email.clone(),
            message: submission.message.clone(),
            ip: submission.ip.clone(),
            user_agent: submission.user_agent.clone(),
            claude_summary: classification.summary.clone(),
            claude_category: classification.category,
            spam_score: classification.spam_score,
        }
    }
}

/// Persists classified submissions.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    async fn insert(&self, record: &SubmissionRecord) -> Result<(), StoreError>;
}
