//! Supabase (PostgREST) table store.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use tracing::info;

use super::{SubmissionRecord, SubmissionStore};
use crate::config::StoreConfig;
use crate::error::StoreError;

const PROVIDER: &str = "supabase";

/// Inserts rows with `POST {base}/rest/v1/{table}`.
pub struct SupabaseStore {
    client: reqwest::Client,
    config: StoreConfig,
}

impl SupabaseStore {
    pub fn new(client: reqwest::Client, config: StoreConfig) -> Self {
        Self { client, config }
    }

    fn not_configured(key: &str) -> StoreError {
        StoreError::NotConfigured {
            provider: PROVIDER.into(),
            key: key.into(),
        }
    }
}

#[async_trait]
impl SubmissionStore for SupabaseStore {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn insert(&self, record: &SubmissionRecord) -> Result<(), StoreError> {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .ok_or_else(|| Self::not_configured("SUPABASE_URL"))?;
        let key = self
            .config
            .service_role_key
            .as_ref()
            .ok_or_else(|| Self::not_configured("SUPABASE_SERVICE_ROLE_KEY"))?
            .expose_secret();

        let url = format!(
            "{}/rest/v1/{}",
            base_url.trim_end_matches('/'),
            self.config.table
        );

        let response = self
            .client
            .post(url)
            .header("apikey", key)
            .bearer_auth(key)
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await
            .map_err(|e| StoreError::RequestFailed {
                provider: PROVIDER.into(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                provider: PROVIDER.into(),
                status: status.as_u16(),
                body,
            });
        }

        info!(table = %self.config.table, "Submission stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::model::Category;

    fn record() -> SubmissionRecord {
        SubmissionRecord {
            name: "Ann".into(),
            email: "ann@example.com".into(),
            message: "hi".into(),
            ip: String::new(),
            user_agent: String::new(),
            claude_summary: String::new(),
            claude_category: Category::Other,
            spam_score: 0.0,
        }
    }

    #[tokio::test]
    async fn missing_url_is_not_configured() {
        let store = SupabaseStore::new(reqwest::Client::new(), StoreConfig::default());
        let err = store.insert(&record()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotConfigured { ref key, .. } if key == "SUPABASE_URL"));
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let config = StoreConfig {
            base_url: Some("http://127.0.0.1:9".into()),
            ..StoreConfig::default()
        };
        let store = SupabaseStore::new(reqwest::Client::new(), config);
        let err = store.insert(&record()).await.unwrap_err();
        assert!(
            matches!(err, StoreError::NotConfigured { ref key, .. } if key == "SUPABASE_SERVICE_ROLE_KEY")
        );
    }
}
