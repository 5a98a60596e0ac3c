//! Error types for the contact relay.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Classification provider errors. Never surfaced to the caller; the
/// pipeline degrades to default classification values instead.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("Classifier {provider} is not configured: missing {key}")]
    NotConfigured { provider: String, key: String },

    #[error("Classifier {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage provider errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store {provider} is not configured: missing {key}")]
    NotConfigured { provider: String, key: String },

    #[error("Store {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Store {provider} rejected the row with status {status}: {body}")]
    Rejected {
        provider: String,
        status: u16,
        body: String,
    },
}

/// Email delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notifier {backend} is not configured: missing {key}")]
    NotConfigured { backend: String, key: String },

    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Notifier {backend} send failed: {reason}")]
    SendFailed { backend: String, reason: String },

    #[error("Notifier {backend} rejected the message with status {status}: {body}")]
    Rejected {
        backend: String,
        status: u16,
        body: String,
    },
}

/// Errors that abort a submission after validation. Mapped to an opaque
/// 500 at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Notification failed: {0}")]
    Notify(#[from] NotifyError),
}
