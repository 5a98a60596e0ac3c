//! Contact-form submission handling: CORS negotiation, validation and the
//! classify → store → notify pipeline behind a single endpoint.

pub mod cors;
pub mod model;
pub mod pipeline;
pub mod routes;

pub use cors::AllowedOrigins;
pub use model::{Category, Classification, ContactForm, Submission};
pub use pipeline::SubmissionPipeline;
pub use routes::contact_routes;

use std::sync::Arc;

use crate::classify::AnthropicClassifier;
use crate::config::ContactConfig;
use crate::notify::create_notifier;
use crate::store::SupabaseStore;

/// Shared state for the contact routes.
#[derive(Clone)]
pub struct ContactState {
    pub origins: Arc<AllowedOrigins>,
    pub pipeline: Arc<SubmissionPipeline>,
}

impl ContactState {
    pub fn new(origins: AllowedOrigins, pipeline: SubmissionPipeline) -> Self {
        Self {
            origins: Arc::new(origins),
            pipeline: Arc::new(pipeline),
        }
    }

    /// Wire the production providers from configuration. All three share
    /// one HTTP client.
    pub fn from_config(config: &ContactConfig) -> Self {
        let client = reqwest::Client::new();
        let pipeline = SubmissionPipeline::new(
            Arc::new(AnthropicClassifier::new(
                client.clone(),
                config.classifier.clone(),
            )),
            Arc::new(SupabaseStore::new(client.clone(), config.store.clone())),
            create_notifier(client, &config.notify),
        );
        Self::new(config.allowed_origins.clone(), pipeline)
    }
}
