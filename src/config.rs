//! Configuration types.
//!
//! Everything is read from the environment once at start-up and handed to
//! the router. Missing provider secrets are not fatal: the affected call
//! fails at request time and is handled by that step's failure policy.

use std::net::SocketAddr;

use secrecy::SecretString;

use crate::contact::cors::AllowedOrigins;
use crate::error::ConfigError;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_CLASSIFIER_MODEL: &str = "claude-3-5-sonnet-latest";
pub const DEFAULT_CLASSIFIER_MAX_TOKENS: u32 = 400;
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_SUPABASE_TABLE: &str = "contact_submissions";
pub const DEFAULT_SENDGRID_BASE_URL: &str = "https://api.sendgrid.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct ContactConfig {
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,
    /// Origins allowed to submit the form.
    pub allowed_origins: AllowedOrigins,
    pub classifier: ClassifierConfig,
    pub store: StoreConfig,
    pub notify: NotifyConfig,
}

/// Anthropic Messages API settings.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            model: DEFAULT_CLASSIFIER_MODEL.to_string(),
            max_tokens: DEFAULT_CLASSIFIER_MAX_TOKENS,
        }
    }
}

/// Supabase REST settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_url: Option<String>,
    pub service_role_key: Option<SecretString>,
    pub table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            service_role_key: None,
            table: DEFAULT_SUPABASE_TABLE.to_string(),
        }
    }
}

/// Operator notification settings.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Operator mailbox. Required for delivery; checked at send time.
    pub to: Option<String>,
    pub from_address: String,
    pub from_name: String,
    pub backend: EmailBackend,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            to: None,
            from_address: "noreply@localhost".to_string(),
            from_name: "Contact form".to_string(),
            backend: EmailBackend::SendGrid(SendGridConfig::default()),
        }
    }
}

/// How notification email leaves the process.
#[derive(Debug, Clone)]
pub enum EmailBackend {
    SendGrid(SendGridConfig),
    Smtp(SmtpConfig),
}

#[derive(Debug, Clone)]
pub struct SendGridConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
}

impl Default for SendGridConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_SENDGRID_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Option<SecretString>,
}

impl ContactConfig {
    /// Build config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup. Empty values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let secret = |key: &str| var(key).map(SecretString::from);

        let bind_addr = var("CONTACT_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "CONTACT_BIND_ADDR".into(),
                message: format!("{e}"),
            })?;

        let allowed_origins = AllowedOrigins::parse(&var("ALLOWED_ORIGINS").unwrap_or_default());

        let max_tokens = match var("CONTACT_CLASSIFIER_MAX_TOKENS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "CONTACT_CLASSIFIER_MAX_TOKENS".into(),
                        message: format!("expected a positive integer, got {raw:?}"),
                    });
                }
            },
            None => DEFAULT_CLASSIFIER_MAX_TOKENS,
        };

        let classifier = ClassifierConfig {
            api_key: secret("ANTHROPIC_API_KEY"),
            base_url: var("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_BASE_URL.to_string()),
            model: var("CONTACT_CLASSIFIER_MODEL")
                .unwrap_or_else(|| DEFAULT_CLASSIFIER_MODEL.to_string()),
            max_tokens,
        };

        let store = StoreConfig {
            base_url: var("SUPABASE_URL"),
            service_role_key: secret("SUPABASE_SERVICE_ROLE_KEY"),
            table: var("SUPABASE_TABLE").unwrap_or_else(|| DEFAULT_SUPABASE_TABLE.to_string()),
        };

        let backend = match var("SMTP_HOST") {
            Some(host) => {
                let port = match var("SMTP_PORT") {
                    Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                        key: "SMTP_PORT".into(),
                        message: format!("expected a port number, got {raw:?}"),
                    })?,
                    None => DEFAULT_SMTP_PORT,
                };
                EmailBackend::Smtp(SmtpConfig {
                    host,
                    port,
                    // SendGrid's SMTP relay authenticates as the literal user
                    // "apikey" with the API key as password.
                    username: var("SMTP_USERNAME").unwrap_or_else(|| "apikey".to_string()),
                    password: secret("SMTP_PASSWORD").or_else(|| secret("SENDGRID_API_KEY")),
                })
            }
            None => EmailBackend::SendGrid(SendGridConfig {
                api_key: secret("SENDGRID_API_KEY"),
                base_url: var("SENDGRID_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_SENDGRID_BASE_URL.to_string()),
            }),
        };

        let defaults = NotifyConfig::default();
        let notify = NotifyConfig {
            to: var("CONTACT_NOTIFY_TO"),
            from_address: var("CONTACT_NOTIFY_FROM").unwrap_or(defaults.from_address),
            from_name: var("CONTACT_NOTIFY_FROM_NAME").unwrap_or(defaults.from_name),
            backend,
        };

        Ok(Self {
            bind_addr,
            allowed_origins,
            classifier,
            store,
            notify,
        })
    }

    /// Names of settings that are unset and will make a provider call fail
    /// at request time.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.allowed_origins.is_empty() {
            missing.push("ALLOWED_ORIGINS");
        }
        if self.classifier.api_key.is_none() {
            missing.push("ANTHROPIC_API_KEY");
        }
        if self.store.base_url.is_none() {
            missing.push("SUPABASE_URL");
        }
        if self.store.service_role_key.is_none() {
            missing.push("SUPABASE_SERVICE_ROLE_KEY");
        }
        if self.notify.to.is_none() {
            missing.push("CONTACT_NOTIFY_TO");
        }
        match &self.notify.backend {
            EmailBackend::SendGrid(sg) if sg.api_key.is_none() => missing.push("SENDGRID_API_KEY"),
            EmailBackend::Smtp(smtp) if smtp.password.is_none() => missing.push("SMTP_PASSWORD"),
            _ => {}
        }
        missing
    }
}
