//! Submission and classification types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Raw request body. Every field is optional so that a missing field is a
/// validation failure rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

impl ContactForm {
    /// Require `name`, `email` and `message` to be present and non-empty.
    ///
    /// Whitespace is kept as-is: a field containing only spaces counts as
    /// present, matching a plain truthiness check.
    pub fn validate(self, client: ClientInfo) -> Option<Submission> {
        let name = self.name.filter(|s| !s.is_empty())?;
        let email = self.email.filter(|s| !s.is_empty())?;
        let message = self.message.filter(|s| !s.is_empty())?;
        Some(Submission {
            name,
            email,
            message,
            ip: client.ip,
            user_agent: client.user_agent,
        })
    }
}

/// Best-effort client details taken from the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip: String,
    pub user_agent: String,
}

/// A validated contact-form submission. Lives for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub message: String,
    pub ip: String,
    pub user_agent: String,
}

/// Inquiry category assigned by the classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    QuoteRequest,
    Hiring,
    Support,
    #[default]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::QuoteRequest => "quote-request",
            Category::Hiring => "hiring",
            Category::Support => "support",
            Category::Other => "other",
        }
    }

    /// Map a provider label onto a category. Accepts the canonical labels,
    /// a few spelling variants and the Japanese labels used by older
    /// prompts. Anything unrecognised is `Other`.
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "quote-request" | "quote" | "見積依頼" => Category::QuoteRequest,
            "hiring" | "recruiting" | "採用" => Category::Hiring,
            "support" | "サポート" => Category::Support,
            _ => Category::Other,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(label) => Category::from_label(&label),
            _ => Category::Other,
        })
    }
}

/// Classifier output. Always present by the time storage runs; all-default
/// when the classifier failed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Classification {
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default, deserialize_with = "lenient_score")]
    pub spam_score: f64,
}

/// Clamp a spam score into [0, 1]. Non-finite scores become 0.
pub fn clamp_spam_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Accepts a string or a number. Any other value yields an empty summary
/// without failing the rest of the classification.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Accepts a number, a numeric string or a boolean. Anything else is 0.
fn lenient_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let raw = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    Ok(clamp_spam_score(raw))
}
