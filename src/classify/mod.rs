//! Inquiry classification.
//!
//! A classifier turns a submission into a summary, a category and a spam
//! score. Failures are reported to the caller as errors; the pipeline is
//! responsible for degrading them to [`Classification::default`].

mod anthropic;

pub use anthropic::AnthropicClassifier;

use async_trait::async_trait;
use tracing::debug;

use crate::contact::model::{Classification, Submission};
use crate::error::ClassifyError;

/// Something that can classify a contact submission.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    async fn classify(&self, submission: &Submission) -> Result<Classification, ClassifyError>;
}

/// Build the classification prompt for a submission.
pub fn build_prompt(submission: &Submission) -> String {
    format!(
        "Summarize the following inquiry, and classify it into one of the categories \
         (quote-request / hiring / support / other), and estimate how likely it is to be spam \
         (0 to 1). Output JSON only.\n\
         name: {name}\n\
         email: {email}\n\
         message: {message}\n\n\
         Output JSON:\n\
         {{\"summary\": \"...\", \"category\": \"...\", \"spam_score\": 0.0}}",
        name = submission.name,
        email = submission.email,
        message = submission.message,
    )
}

/// Parse the model's text output into a classification. Only the first JSON
/// object is read; anything after it is ignored.
pub fn parse_classification(text: &str) -> Result<Classification, ClassifyError> {
    let json = extract_json_object(text);
    let object = serde_json::Deserializer::from_str(json)
        .into_iter::<serde_json::Map<String, serde_json::Value>>()
        .next()
        .ok_or_else(|| ClassifyError::InvalidResponse {
            provider: "classifier".into(),
            reason: "no JSON object in model output".into(),
        })??;
    let classification: Classification =
        serde_json::from_value(serde_json::Value::Object(object))?;
    debug!(
        category = %classification.category,
        spam_score = classification.spam_score,
        "Parsed classification"
    );
    Ok(classification)
}

/// Locate the JSON object in model output that might be wrapped in a
/// markdown fence or preceded by prose. The returned slice starts at the
/// object and may carry trailing text.
fn extract_json_object(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        if let Some(end) = after.find("```") {
            let inner = after[..end].trim();
            if inner.starts_with('{') {
                return inner;
            }
        }
    }

    match trimmed.find('{') {
        Some(start) => &trimmed[start..],
        None => trimmed,
    }
}
